mod observations;
mod statistics;
