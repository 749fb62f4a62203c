//! SIMD-intrinsic spline evaluation
//!
//! Each fast path mirrors the portable evaluator of the same variant
//! operation for operation (multiply and add, never fused) so results stay
//! bit-identical to the scalar reference.

#[cfg(target_arch = "x86_64")]
pub mod sse;

#[cfg(target_arch = "x86_64")]
pub mod avx2;

// AVX-512 requires Rust 1.89+ (stable) or nightly with feature flags
#[cfg(all(target_arch = "x86_64", has_stable_avx512))]
pub mod avx512;

/// Names of the instruction sets the dispatching evaluators will use
pub fn detected_features() -> Vec<&'static str> {
    #[allow(unused_mut)]
    let mut features = Vec::new();

    #[cfg(target_arch = "x86_64")]
    {
        features.push("sse2");
        if is_x86_feature_detected!("avx2") {
            features.push("avx2");
        }
        #[cfg(has_stable_avx512)]
        if is_x86_feature_detected!("avx512f") {
            features.push("avx512f");
        }
    }

    features
}
