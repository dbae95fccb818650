#![allow(dead_code)]
use std::fs;

pub const WORKLOADS: [(&str, &str); 2] = [
    ("script", "tests/programs/script/program.py"),
    ("branching", "tests/programs/branching/program.py"),
];

pub fn workloads() -> [(&'static str, &'static str); 2] {
    WORKLOADS
}

pub fn load_source(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {path}: {err}"))
}
