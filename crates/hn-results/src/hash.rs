//! Content-based hashing for run IDs.

use sha2::{Digest, Sha256};

/// Run id derived from the serialized network, the serialized simulation
/// settings and the solver version. Identical inputs map to the same run.
pub fn compute_run_id(network_json: &str, config_json: &str, solver_version: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(network_json.as_bytes());
    // Separator so that moving bytes between the parts changes the hash.
    hasher.update([0u8]);
    hasher.update(config_json.as_bytes());
    hasher.update([0u8]);
    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_stability() {
        let a = compute_run_id("{\"nodes\":[]}", "{\"dt\":900}", "v1");
        let b = compute_run_id("{\"nodes\":[]}", "{\"dt\":900}", "v1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let a = compute_run_id("net", "cfg", "v1");
        assert_ne!(a, compute_run_id("net", "cfg", "v2"));
        assert_ne!(a, compute_run_id("ne", "tcfg", "v1"));
    }
}
