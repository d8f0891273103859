//! Extras attached to a travel answer: a packing tip and a map

pub mod map;
pub mod vibe;

pub use map::{build_map_embed_url, build_map_link};
pub use vibe::{Vibe, generate_vibe_tip};
