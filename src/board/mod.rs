mod geometry;
mod layout;

pub use geometry::{BoardGeometry, SquareRect};
pub use layout::{board_field, encode_layout, ranks, tokens, validate, Grid, Token};
