mod heuristics;
mod refine;
mod service;
