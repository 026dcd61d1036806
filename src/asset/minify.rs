//! Minification backends for the `jsmin` and `cssmin` filters.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Both report a
//! `FilterError` instead of passing invalid input through unchanged.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::FilterError;

/// Minify JavaScript source code.
///
/// Sources are parsed as scripts, not modules: bundles are concatenated
/// plain files, and top-level names must stay unmangled.
pub fn minify_js(source: &str) -> Result<String, FilterError> {
    let allocator = Allocator::default();
    let source_type = SourceType::cjs();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return Err(FilterError::new(format!(
            "javascript parse failed with {} error(s)",
            ret.errors.len()
        )));
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Result<String, FilterError> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| FilterError::new(format!("css parse failed: {e}")))?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| FilterError::new(format!("css print failed: {e}")))?;
    Ok(result.code)
}
