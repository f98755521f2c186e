//! OGC WMS client-side protocol support.
//!
//! Supports:
//! - Capability discovery for WMS 1.1.0, 1.1.1 and 1.3.0 documents
//! - GetMap request templating with a per-frame bounding box hole
//! - A pluggable HTTP transport

pub mod capabilities;
pub mod client;
pub mod encode;
pub mod getmap;
pub mod xml;

pub use capabilities::{capabilities_request_url, parse_capabilities, resolve, ServiceDescriptor};
pub use client::{HttpTransport, Transport};
pub use encode::{is_unreserved, percent_encode};
pub use getmap::RequestTemplate;
pub use xml::{find_child, find_path, parse_document, XmlAttribute, XmlNode, XLINK_NS};
