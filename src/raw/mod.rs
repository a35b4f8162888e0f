/// Image file decoding module
///
/// This module handles:
/// - Decoding previews for display, including RAW files via their
///   embedded JPEGs

pub mod preview;
