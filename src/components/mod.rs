pub mod attack_theater;
pub mod dependency_graph;
