pub mod color_aggregator;
pub mod grid_classifier;
pub mod highlight;
pub mod numbering;
pub mod palette;
pub mod path_orderer;
pub mod pixel_grid;
pub mod sequence_encoder;
