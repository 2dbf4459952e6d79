//! Presentation payloads injected into every simplified document.
//!
//! Both are embedded verbatim. The class names they target are the markers
//! written by [`crate::simplify`].

/// Inlined into the output `<head>`.
pub const STYLE: &str = include_str!("../assets/simplified.css");

/// Inlined as the first child of the output `<body>`.
pub const SCRIPT: &str = include_str!("../assets/simplified.js");
