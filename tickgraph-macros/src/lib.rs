use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

mod node_meta;
use node_meta::{parse_fields, parse_node_info, parse_ports, PortField};

/// Implements `crate::registry::NodeType` for a node struct.
///
/// The generated metadata is only returned from `NodeType::metadata()`;
/// nothing is registered until the registry is asked to.
#[proc_macro_derive(NodeType, attributes(node_meta, param, input, output))]
pub fn derive_node_type(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let node_info = match parse_node_info(&input) {
        Ok(info) => info,
        Err(e) => return e.write_errors().into(),
    };

    let fields = match parse_fields(&input) {
        Ok(fields) => fields,
        Err(e) => return e.write_errors().into(),
    };

    let (inputs, outputs) = match parse_ports(&input) {
        Ok(ports) => ports,
        Err(e) => return e.write_errors().into(),
    };

    let struct_name = &input.ident;
    let type_name = struct_name.to_string();
    let node_name = &node_info.name;
    let category = &node_info.category;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let params = fields.iter().filter_map(|f| {
        let field_name = f.ident.as_ref()?.to_string();
        let type_name = extract_type_name(&f.ty);

        let default_code = match f.default.as_deref() {
            Some(raw) => quote! {
                serde_json::from_str(#raw)
                    .unwrap_or_else(|_| serde_json::Value::String(#raw.to_string()))
            },
            None => quote! { serde_json::Value::Null },
        };
        let min = option_tokens(f.min);
        let max = option_tokens(f.max);

        Some(quote! {
            crate::registry::ParameterSchema {
                name: #field_name.to_string(),
                param_type: #type_name.to_string(),
                default: #default_code,
                min: #min,
                max: #max,
            }
        })
    });

    let input_metas = inputs.iter().map(port_metadata);
    let output_metas = outputs.iter().map(port_metadata);

    let expanded = quote! {
        impl #impl_generics crate::registry::NodeType for #struct_name #ty_generics #where_clause {
            fn metadata() -> crate::registry::NodeMetadata {
                crate::registry::NodeMetadata {
                    type_name: #type_name.to_string(),
                    name: #node_name.to_string(),
                    category: #category.to_string(),
                    inputs: vec![#(#input_metas),*],
                    outputs: vec![#(#output_metas),*],
                    parameters: vec![#(#params),*],
                    factory: || Box::new(<#struct_name #ty_generics as ::core::default::Default>::default()),
                }
            }
        }
    };

    TokenStream::from(expanded)
}

fn port_metadata(port: &PortField) -> proc_macro2::TokenStream {
    let tag = port.resolved_tag();
    let data_type = port.data_type.as_deref().unwrap_or("any");

    quote! {
        crate::registry::PortMetadata {
            tag: #tag.to_string(),
            data_type: #data_type.to_string(),
        }
    }
}

fn option_tokens(value: Option<f64>) -> proc_macro2::TokenStream {
    match value {
        Some(v) => quote! { Some(#v) },
        None => quote! { None },
    }
}

fn extract_type_name(ty: &syn::Type) -> &'static str {
    let type_str = quote!(#ty).to_string();

    if type_str.contains("f64") || type_str.contains("f32") {
        "number"
    } else if type_str.contains("u32") || type_str.contains("i32")
        || type_str.contains("u64") || type_str.contains("i64")
        || type_str.contains("usize") || type_str.contains("isize") {
        "integer"
    } else if type_str.contains("String") || type_str.contains("str") {
        "string"
    } else if type_str.contains("bool") {
        "boolean"
    } else {
        "unknown"
    }
}
