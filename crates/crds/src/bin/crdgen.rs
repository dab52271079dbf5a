//! Prints the CustomResourceDefinition YAML for the CRD this repo owns.
//!
//! ClusterPolicy and ClusterServiceVersion are third-party APIs; their CRDs
//! ship with the GPU operator and OLM respectively.

use crds::GPUAddon;
use kube::CustomResourceExt;

fn main() {
    match serde_yaml::to_string(&GPUAddon::crd()) {
        Ok(yaml) => print!("{}", yaml),
        Err(e) => {
            eprintln!("Failed to serialize GPUAddon CRD: {}", e);
            std::process::exit(1);
        }
    }
}
