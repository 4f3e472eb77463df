//! CCRN Core - naming convention types and surface-syntax codecs
//!
//! A resource identity can be written in two ways:
//! - **Field list**: `ccrn=pod.k8s-registry.ccrn.example.com/v1, cluster=eu-de-1, name=my-pod`
//! - **URN**: `urn:ccrn:pod.k8s-registry.ccrn.example.com/v1/eu-de-1/my-pod`
//!
//! This crate parses both forms into a [`ParsedResource`] and renders either
//! form back from its fields. It never consults a type directory; resolving
//! which URN template applies to a type is left to the caller.

pub mod error;
pub mod fieldlist;
pub mod resource;
pub mod urn;

pub use error::{CcrnError, Result};
pub use fieldlist::{FIELD_LIST_PREFIX, parse_field_list, render_field_list};
pub use resource::{CCRN_FIELD, Fields, Format, ParsedResource, detect_format};
pub use urn::{
    DEFAULT_URN_TEMPLATE, URN_PREFIX, parse_urn, parse_urn_type_key, render_urn,
    unresolved_placeholders,
};
