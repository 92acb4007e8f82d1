//! `html!` / `html_fragment!`: split a template literal at `{}` at compile
//! time and generate a call into `folio::template`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Error, Expr, LitStr, Result, Token};

/// Which renderer entry point the macro expands to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Entry {
    Element,
    Fragment,
}

/// `dom, "template", value, value, ...`
struct HtmlInput {
    dom: Expr,
    template: LitStr,
    values: Vec<Expr>,
}

impl Parse for HtmlInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let dom: Expr = input.parse()?;
        input.parse::<Token![,]>()?;
        let template: LitStr = input.parse()?;
        let mut values = Vec::new();
        if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            let rest = Punctuated::<Expr, Token![,]>::parse_terminated(input)?;
            values.extend(rest);
        }
        Ok(HtmlInput {
            dom,
            template,
            values,
        })
    }
}

/// Split a template at `{}` placeholders. `{{` and `}}` stand for literal
/// braces.
pub(crate) fn split_template(template: &str) -> std::result::Result<Vec<String>, String> {
    let mut fragments = vec![String::new()];
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        let current = fragments.last_mut().ok_or("empty fragment list")?;
        match (ch, chars.peek()) {
            ('{', Some('{')) => {
                chars.next();
                current.push('{');
            }
            ('{', Some('}')) => {
                chars.next();
                fragments.push(String::new());
            }
            ('}', Some('}')) => {
                chars.next();
                current.push('}');
            }
            ('{', _) => return Err("expected `{}` placeholder or `{{` escape".into()),
            ('}', _) => return Err("unmatched `}`, use `}}` for a literal brace".into()),
            (other, _) => current.push(other),
        }
    }
    Ok(fragments)
}

pub(crate) fn html_impl(input: TokenStream, entry: Entry) -> Result<TokenStream> {
    let HtmlInput {
        dom,
        template,
        values,
    } = syn::parse2(input)?;

    let fragments =
        split_template(&template.value()).map_err(|msg| Error::new(template.span(), msg))?;
    let placeholders = fragments.len() - 1;
    if placeholders != values.len() {
        return Err(Error::new(
            template.span(),
            format!(
                "template has {} placeholder(s) but {} value(s) were given",
                placeholders,
                values.len()
            ),
        ));
    }

    let function = match entry {
        Entry::Element => quote! { ::folio::template::html_element },
        Entry::Fragment => quote! { ::folio::template::html_fragment },
    };

    Ok(quote! {
        #function(
            &(#dom),
            &[#(#fragments),*],
            ::std::vec![#(::folio::template::Renderable::from(#values)),*],
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    #[test]
    fn split_plain() {
        assert_eq!(split_template("<p>hi</p>").unwrap(), vec!["<p>hi</p>"]);
    }

    #[test]
    fn split_placeholders() {
        assert_eq!(
            split_template("<li>{}: {}</li>").unwrap(),
            vec!["<li>", ": ", "</li>"]
        );
    }

    #[test]
    fn split_escaped_braces() {
        assert_eq!(
            split_template("<code>{{x}}</code>{}").unwrap(),
            vec!["<code>{x}</code>", ""]
        );
    }

    #[test]
    fn split_rejects_stray_braces() {
        assert!(split_template("<p>{x}</p>").is_err());
        assert!(split_template("<p>}</p>").is_err());
    }

    #[test]
    fn expands_to_element_call() {
        let out = html_impl(quote! { dom, "<b>{}</b>", name }, Entry::Element).unwrap();
        let text = out.to_string();
        assert!(text.contains("html_element"));
        assert!(text.contains("Renderable :: from (name)"));
    }

    #[test]
    fn expands_to_fragment_call() {
        let out = html_impl(quote! { dom, "<i></i><i></i>" }, Entry::Fragment).unwrap();
        assert!(out.to_string().contains("html_fragment"));
    }

    #[test]
    fn trailing_comma_is_accepted() {
        assert!(html_impl(quote! { dom, "<b>{}</b>", x, }, Entry::Element).is_ok());
    }

    #[test]
    fn argument_count_is_checked() {
        let err = html_impl(quote! { dom, "<b>{}</b>" }, Entry::Element).unwrap_err();
        assert!(err.to_string().contains("1 placeholder(s) but 0 value(s)"));
        assert!(html_impl(quote! { dom, "<b></b>", x }, Entry::Element).is_err());
    }
}
