use proc_macro::TokenStream;
use quote::{format_ident, quote, ToTokens};
use syn::{parse_macro_input, ItemStruct};

/// Turn a struct declaration into a zero-copy reader/writer for a fixed-layout
/// little-endian header.
///
/// Fields are laid out back to back in declaration order. Every field gets a
/// getter and a `set_*` setter; fields whose name starts with `reserved` only
/// take up space. Supported field types are `u8`, `u16`, `u32` and `u64`.
///
/// The generated `new` refers to `crate::DecodeError` and `crate::Malformed`,
/// so the macro is meant to be used from within `wpanctl-attr`.
#[proc_macro_attribute]
pub fn wire(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);

    let item_attr = input.attrs;
    let vis = input.vis;
    let name = input.ident;

    let mut getters = vec![];
    let mut setters = vec![];

    let mut offset = 0usize;

    for field in input.fields {
        let Some(fnname) = field.ident else {
            return syn::Error::new_spanned(&name, "#[wire] requires named fields")
                .to_compile_error()
                .into();
        };
        let ty = field.ty;

        let doc: Vec<_> = field
            .attrs
            .iter()
            .filter(|attr| attr.path().is_ident("doc"))
            .collect();

        let bytes = match ty.to_token_stream().to_string().as_str() {
            "u8" => 1usize,
            "u16" => 2,
            "u32" => 4,
            "u64" => 8,
            other => {
                return syn::Error::new_spanned(
                    &ty,
                    format!("unsupported #[wire] field type `{other}`"),
                )
                .to_compile_error()
                .into();
            }
        };

        if !fnname.to_string().starts_with("reserved") {
            let setter = format_ident!("set_{}", fnname);
            let setter_doc = format!("Set the `{fnname}` field.");

            getters.push(quote! {
                #(#doc)*
                pub fn #fnname(&self) -> #ty {
                    let mut raw = [0u8; #bytes];
                    raw.copy_from_slice(&self.buffer.as_ref()[#offset..][..#bytes]);
                    <#ty>::from_le_bytes(raw)
                }
            });

            setters.push(quote! {
                #[doc = #setter_doc]
                pub fn #setter(&mut self, value: #ty) {
                    self.buffer.as_mut()[#offset..][..#bytes]
                        .copy_from_slice(&value.to_le_bytes());
                }
            });
        }

        offset += bytes;
    }

    let f = quote! {
        #(#item_attr)*
        #vis struct #name<T: AsRef<[u8]>> {
            buffer: T,
        }

        impl<T: AsRef<[u8]>> #name<T> {
            /// Create a new reader/writer, checking that the buffer is large
            /// enough to hold the header.
            pub fn new(buffer: T) -> crate::Result<Self> {
                let header = Self::new_unchecked(buffer);

                if !header.check_len() {
                    return Err(crate::DecodeError::Malformed(crate::Malformed::Truncated {
                        needed: Self::size(),
                        available: header.buffer.as_ref().len(),
                    }));
                }

                Ok(header)
            }

            /// Create a new reader/writer without checking the buffer length.
            pub fn new_unchecked(buffer: T) -> Self {
                Self { buffer }
            }

            /// Returns `false` if the buffer is too short for the header.
            pub fn check_len(&self) -> bool {
                self.buffer.as_ref().len() >= Self::size()
            }

            /// Consume the reader/writer and return the underlying buffer.
            pub fn into_inner(self) -> T {
                self.buffer
            }

            /// Returns the size of this header in bytes.
            pub const fn size() -> usize {
                #offset
            }

            #(#getters)*
        }

        impl<T: AsRef<[u8]> + AsMut<[u8]>> #name<T> {
            #(#setters)*
        }
    };

    f.into()
}
