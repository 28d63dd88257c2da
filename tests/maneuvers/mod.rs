mod chain;
mod geometry;
