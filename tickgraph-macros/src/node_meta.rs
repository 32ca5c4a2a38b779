use darling::{FromAttributes, FromField};
use syn::{DeriveInput, Fields};

/// Parsed attributes from #[node_meta(...)]
#[derive(Debug, FromAttributes)]
#[darling(attributes(node_meta))]
pub struct NodeMetaArgs {
    pub name: String,
    pub category: String,
}

/// Parsed attributes from #[param(...)]
#[derive(Debug, FromField)]
#[darling(attributes(param))]
pub struct ParamField {
    pub ident: Option<syn::Ident>,
    pub ty: syn::Type,

    #[darling(default)]
    pub default: Option<String>,

    #[darling(default)]
    pub min: Option<f64>,

    #[darling(default)]
    pub max: Option<f64>,
}

/// Parsed attributes from #[input(...)] / #[output(...)]
#[derive(Debug, FromField)]
#[darling(attributes(input, output))]
pub struct PortField {
    pub ident: Option<syn::Ident>,

    #[darling(default)]
    pub tag: Option<String>,

    #[darling(default)]
    pub data_type: Option<String>,
}

impl PortField {
    /// Explicit tag, or the field name upper-cased with any leading
    /// underscore removed.
    pub fn resolved_tag(&self) -> String {
        match (&self.tag, &self.ident) {
            (Some(tag), _) => tag.clone(),
            (None, Some(ident)) => ident.to_string().trim_start_matches('_').to_uppercase(),
            (None, None) => String::new(),
        }
    }
}

pub fn parse_node_info(input: &DeriveInput) -> darling::Result<NodeMetaArgs> {
    NodeMetaArgs::from_attributes(&input.attrs)
}

fn named_fields(input: &DeriveInput) -> Option<&syn::punctuated::Punctuated<syn::Field, syn::token::Comma>> {
    match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Some(&fields.named),
            _ => None,
        },
        _ => None,
    }
}

pub fn parse_fields(input: &DeriveInput) -> darling::Result<Vec<ParamField>> {
    let Some(fields) = named_fields(input) else {
        return Ok(Vec::new());
    };

    fields
        .iter()
        .filter(|f| f.attrs.iter().any(|attr| attr.path().is_ident("param")))
        .map(ParamField::from_field)
        .collect()
}

pub fn parse_ports(input: &DeriveInput) -> darling::Result<(Vec<PortField>, Vec<PortField>)> {
    let Some(fields) = named_fields(input) else {
        return Ok((Vec::new(), Vec::new()));
    };

    let mut inputs = Vec::new();
    let mut outputs = Vec::new();

    for field in fields.iter() {
        if field.attrs.iter().any(|attr| attr.path().is_ident("input")) {
            inputs.push(PortField::from_field(field)?);
        }

        if field.attrs.iter().any(|attr| attr.path().is_ident("output")) {
            outputs.push(PortField::from_field(field)?);
        }
    }

    Ok((inputs, outputs))
}
