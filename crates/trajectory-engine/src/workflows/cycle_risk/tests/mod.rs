mod common;
mod detectors;
mod reconciler;
