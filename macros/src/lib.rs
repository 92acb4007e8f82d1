//! Proc macros for folio: `html!` and `html_fragment!` template literals.
//!
//! This crate is not meant to be used directly; the macros are re-exported
//! from `folio`.

use proc_macro::TokenStream;

mod html_macro;

use html_macro::Entry;

/// Render a template literal that produces exactly one element.
///
/// Expands to a `folio::template::html_element` call returning
/// `Result<NodeId, TemplateError>`. Each `{}` placeholder takes the next value,
/// converted with `Renderable::from`. Use `{{` and `}}` for literal braces. The
/// number of values is checked at compile time.
///
/// # Example
///
/// ```ignore
/// let li = html!(dom, r#"<li class="comment"><span>{}</span> {}</li>"#,
///     name_text,
///     vote_button,
/// )?;
/// ```
#[proc_macro]
pub fn html(input: TokenStream) -> TokenStream {
    html_macro::html_impl(input.into(), Entry::Element)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// Like [`html!`], but returns every top-level node:
/// `Result<Vec<NodeId>, TemplateError>`.
#[proc_macro]
pub fn html_fragment(input: TokenStream) -> TokenStream {
    html_macro::html_impl(input.into(), Entry::Fragment)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
