//! Asset minification for HTML, CSS, and JavaScript.

use crate::error::{Error, Result};

/// Text asset kinds that can be minified, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Html,
    Css,
    Js,
    Other,
}

impl AssetKind {
    pub fn from_name(name: &str) -> Self {
        match name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
            Some(ext) if ext == "html" || ext == "htm" => AssetKind::Html,
            Some(ext) if ext == "css" => AssetKind::Css,
            Some(ext) if ext == "js" || ext == "mjs" => AssetKind::Js,
            _ => AssetKind::Other,
        }
    }
}

/// Minify a static asset when `enabled`, returning the bytes to write.
///
/// Files that are not HTML, CSS or JS pass through untouched.
pub fn asset(name: &str, contents: &[u8], enabled: bool) -> Result<Vec<u8>> {
    let kind = AssetKind::from_name(name);
    if !enabled || kind == AssetKind::Other {
        return Ok(contents.to_vec());
    }

    let input = std::str::from_utf8(contents)
        .map_err(|e| Error::Other(format!("invalid UTF-8 in {}: {}", name, e)))?;

    let output = match kind {
        AssetKind::Html => html(input)?,
        AssetKind::Css => css(input)?,
        AssetKind::Js => js(input),
        AssetKind::Other => unreachable!("handled above"),
    };

    tracing::trace!(
        asset = name,
        before = contents.len(),
        after = output.len(),
        "minified"
    );

    Ok(output.into_bytes())
}

/// Minify HTML content, including inline `<style>` and `<script>` blocks.
pub fn html(input: &str) -> Result<String> {
    let cfg = minify_html::Cfg {
        minify_css: true,
        minify_js: true,
        ..Default::default()
    };

    let bytes = minify_html::minify(input.as_bytes(), &cfg);
    String::from_utf8(bytes).map_err(|e| Error::Other(e.to_string()))
}

/// Minify CSS content.
pub fn css(input: &str) -> Result<String> {
    use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

    let stylesheet = StyleSheet::parse(input, ParserOptions::default())
        .map_err(|e| Error::Other(format!("CSS parse error: {}", e)))?;

    let minified = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| Error::Other(format!("CSS minify error: {}", e)))?;

    Ok(minified.code)
}

/// Minify JavaScript content.
///
/// Returns the original input if parsing fails.
pub fn js(input: &str) -> String {
    use oxc::allocator::Allocator;
    use oxc::codegen::{Codegen, CodegenOptions};
    use oxc::minifier::{Minifier, MinifierOptions};
    use oxc::parser::Parser;
    use oxc::span::SourceType;

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, input, SourceType::mjs()).parse();

    if !ret.errors.is_empty() {
        tracing::warn!(errors = ret.errors.len(), "JS parse error, using original");
        return input.to_string();
    }

    let mut program = ret.program;
    Minifier::new(MinifierOptions::default()).minify(&allocator, &mut program);

    Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            ..Default::default()
        })
        .build(&program)
        .code
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("index.html" => AssetKind::Html)]
    #[test_case("style.CSS" => AssetKind::Css)]
    #[test_case("carousel.js" => AssetKind::Js)]
    #[test_case("cv.pdf" => AssetKind::Other)]
    #[test_case("LICENSE" => AssetKind::Other)]
    fn kind_from_name(name: &str) -> AssetKind {
        AssetKind::from_name(name)
    }

    #[test]
    fn html_minifies_whitespace() {
        let input = r#"
            <html>
                <head>
                    <title>Portfolio</title>
                </head>
                <body>
                    <p>Hello   world</p>
                </body>
            </html>
        "#;
        let output = html(input).unwrap();
        assert!(!output.contains("    "));
        assert!(output.contains("<title>Portfolio</title>"));
    }

    #[test]
    fn css_minifies() {
        let input = r#"
            .carousel {
                margin: 0;
                padding: 0;
            }
        "#;
        let output = css(input).unwrap();
        assert!(!output.contains('\n'));
        assert!(output.contains("margin:0"));
    }

    #[test]
    fn js_minifies() {
        let input = r#"
            var threshold = 60;
            var index = 0;
            console.log(threshold + index);
        "#;
        let output = js(input);
        assert!(output.len() < input.len());
        assert!(output.contains("console"));
    }

    #[test]
    fn disabled_passes_through() {
        let input = b"body {\n  margin: 0;\n}\n";
        assert_eq!(asset("style.css", input, false).unwrap(), input.to_vec());
    }

    #[test]
    fn binary_assets_pass_through() {
        let input = [0xffu8, 0xd8, 0xff, 0x00];
        assert_eq!(asset("shot.jpg", &input, true).unwrap(), input.to_vec());
    }

    #[test]
    fn invalid_utf8_css_is_an_error() {
        assert!(asset("style.css", &[0xff, 0xfe], true).is_err());
    }
}
