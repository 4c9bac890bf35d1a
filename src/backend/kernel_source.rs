//! CUDA C source for the left-regime kernel, compiled at runtime.

/// One lane per worker. Each lane runs the same chunk loop as the CPU
/// workers: modular exponentiation per term, accumulate, drop the integer
/// part after every addition. Lane `idx` covers the range starting at
/// `k0 + idx * lane_terms` and writes its partial sum to `out[idx]`.
///
/// The bit ladder recomputes the leading power of two per call instead of
/// caching it; a per-device static table would race across lanes.
pub const BBP_KERNEL_SOURCE: &str = r#"
extern "C" __device__ double pow16_mod(long long n, double k)
{
    if (n <= 0) {
        return 1.0;
    }

    long long bit = 1;
    while ((bit << 1) <= n) {
        bit <<= 1;
    }

    double r = 1.0;
    while (bit >= 1) {
        if (n >= bit) {
            r = r * 16.0;
            r = r - floor(r / k) * k;
            n = n - bit;
        }
        bit >>= 1;
        if (bit >= 1) {
            r = r * r;
            r = r - floor(r / k) * k;
        }
    }
    return r;
}

extern "C" __global__ void bbp_left_chunks(double* out,
                                           long long lane_terms,
                                           int j,
                                           long long d,
                                           long long k0)
{
    long long idx = (long long)blockIdx.x * blockDim.x + threadIdx.x;
    long long k = k0 + idx * lane_terms;

    double s = 0.0;
    for (long long i = 0; i < lane_terms; ++i, ++k) {
        double denom = (double)(8 * k + j);
        s += pow16_mod(d - k, denom) / denom;
        s -= floor(s);
    }
    out[idx] = s;
}
"#;
