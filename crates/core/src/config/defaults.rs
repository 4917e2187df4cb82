//! Default values and functions for configuration

pub(crate) fn default_relevance_threshold() -> u32 {
    1
}

pub(crate) fn default_judged_docs_only() -> bool {
    false
}

pub(crate) fn default_map_cutoffs() -> Vec<usize> {
    vec![5, 10, 15, 20, 30, 100, 200, 500, 1000]
}
