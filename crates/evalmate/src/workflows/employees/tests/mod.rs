mod common;
mod graph;
