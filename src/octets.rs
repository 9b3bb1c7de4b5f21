use crate::octet::Octet;
use crate::octet::OCTET_MUL;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use crate::octet::OCTET_MUL_HI_BITS;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use crate::octet::OCTET_MUL_LOW_BITS;
#[cfg(target_arch = "x86")]
use std::arch::x86::__m256i;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::__m256i;

// Row kernels. Every symbol operation of the solver ends up in one of these three functions.

fn add_assign_fallback(octets: &mut [u8], other: &[u8]) {
    let mut dest_words = octets.chunks_exact_mut(8);
    let mut src_words = other.chunks_exact(8);
    for (dest, src) in (&mut dest_words).zip(&mut src_words) {
        let mut word = [0u8; 8];
        word.copy_from_slice(dest);
        let mut other_word = [0u8; 8];
        other_word.copy_from_slice(src);
        let value = u64::from_ne_bytes(word) ^ u64::from_ne_bytes(other_word);
        dest.copy_from_slice(&value.to_ne_bytes());
    }
    for (dest, src) in dest_words
        .into_remainder()
        .iter_mut()
        .zip(src_words.remainder())
    {
        *dest ^= *src;
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[target_feature(enable = "avx2")]
unsafe fn add_assign_avx2(octets: &mut [u8], other: &[u8]) {
    #[cfg(target_arch = "x86")]
    use std::arch::x86::*;
    #[cfg(target_arch = "x86_64")]
    use std::arch::x86_64::*;

    let lanes = octets.len() / 32;
    let dest_ptr = octets.as_mut_ptr() as *mut __m256i;
    let src_ptr = other.as_ptr() as *const __m256i;
    for i in 0..lanes {
        let value = _mm256_xor_si256(
            _mm256_loadu_si256(dest_ptr.add(i)),
            _mm256_loadu_si256(src_ptr.add(i)),
        );
        _mm256_storeu_si256(dest_ptr.add(i), value);
    }
    let done = lanes * 32;
    add_assign_fallback(&mut octets[done..], &other[done..]);
}

/// `octets += other`
pub fn add_assign(octets: &mut [u8], other: &[u8]) {
    assert_eq!(octets.len(), other.len());
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if is_x86_feature_detected!("avx2") {
            // SAFETY: avx2 support was checked above and both slices have the same length.
            unsafe {
                return add_assign_avx2(octets, other);
            }
        }
    }
    add_assign_fallback(octets, other)
}

fn mulassign_scalar_fallback(octets: &mut [u8], scalar: &Octet) {
    let table = &OCTET_MUL[scalar.byte() as usize];
    for item in octets.iter_mut() {
        *item = table[*item as usize];
    }
}

// Shuffle based multiply of 32 bytes, see "Screaming Fast Galois Field Arithmetic Using Intel SIMD
// Instructions" by Plank et al.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[target_feature(enable = "avx2")]
unsafe fn mul_lane_avx2(value: __m256i, scalar: u8) -> __m256i {
    #[cfg(target_arch = "x86")]
    use std::arch::x86::*;
    #[cfg(target_arch = "x86_64")]
    use std::arch::x86_64::*;

    let low_table =
        _mm256_loadu_si256(OCTET_MUL_LOW_BITS[scalar as usize].as_ptr() as *const __m256i);
    let hi_table =
        _mm256_loadu_si256(OCTET_MUL_HI_BITS[scalar as usize].as_ptr() as *const __m256i);
    let low_mask = _mm256_set1_epi8(0x0F);
    let low = _mm256_and_si256(value, low_mask);
    let hi = _mm256_and_si256(_mm256_srli_epi64(value, 4), low_mask);
    _mm256_xor_si256(
        _mm256_shuffle_epi8(low_table, low),
        _mm256_shuffle_epi8(hi_table, hi),
    )
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[target_feature(enable = "avx2")]
unsafe fn mulassign_scalar_avx2(octets: &mut [u8], scalar: &Octet) {
    #[cfg(target_arch = "x86")]
    use std::arch::x86::*;
    #[cfg(target_arch = "x86_64")]
    use std::arch::x86_64::*;

    let lanes = octets.len() / 32;
    let ptr = octets.as_mut_ptr() as *mut __m256i;
    for i in 0..lanes {
        let product = mul_lane_avx2(_mm256_loadu_si256(ptr.add(i)), scalar.byte());
        _mm256_storeu_si256(ptr.add(i), product);
    }
    mulassign_scalar_fallback(&mut octets[lanes * 32..], scalar);
}

/// `octets *= scalar`
pub fn mulassign_scalar(octets: &mut [u8], scalar: &Octet) {
    if *scalar == Octet::one() {
        return;
    }
    if scalar.is_zero() {
        octets.iter_mut().for_each(|item| *item = 0);
        return;
    }
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if is_x86_feature_detected!("avx2") {
            // SAFETY: avx2 support was checked above.
            unsafe {
                return mulassign_scalar_avx2(octets, scalar);
            }
        }
    }
    mulassign_scalar_fallback(octets, scalar)
}

fn fused_addassign_mul_scalar_fallback(octets: &mut [u8], other: &[u8], scalar: &Octet) {
    let table = &OCTET_MUL[scalar.byte() as usize];
    for (dest, src) in octets.iter_mut().zip(other) {
        *dest ^= table[*src as usize];
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[target_feature(enable = "avx2")]
unsafe fn fused_addassign_mul_scalar_avx2(octets: &mut [u8], other: &[u8], scalar: &Octet) {
    #[cfg(target_arch = "x86")]
    use std::arch::x86::*;
    #[cfg(target_arch = "x86_64")]
    use std::arch::x86_64::*;

    let lanes = octets.len() / 32;
    let dest_ptr = octets.as_mut_ptr() as *mut __m256i;
    let src_ptr = other.as_ptr() as *const __m256i;
    for i in 0..lanes {
        let product = mul_lane_avx2(_mm256_loadu_si256(src_ptr.add(i)), scalar.byte());
        let value = _mm256_xor_si256(_mm256_loadu_si256(dest_ptr.add(i)), product);
        _mm256_storeu_si256(dest_ptr.add(i), value);
    }
    let done = lanes * 32;
    fused_addassign_mul_scalar_fallback(&mut octets[done..], &other[done..], scalar);
}

/// `octets += scalar * other`
pub fn fused_addassign_mul_scalar(octets: &mut [u8], other: &[u8], scalar: &Octet) {
    assert_eq!(octets.len(), other.len());
    if scalar.is_zero() {
        return;
    }
    if *scalar == Octet::one() {
        return add_assign(octets, other);
    }
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if is_x86_feature_detected!("avx2") {
            // SAFETY: avx2 support was checked above and both slices have the same length.
            unsafe {
                return fused_addassign_mul_scalar_avx2(octets, other, scalar);
            }
        }
    }
    fused_addassign_mul_scalar_fallback(octets, other, scalar)
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use crate::octet::Octet;
    use crate::octets::{add_assign, fused_addassign_mul_scalar, mulassign_scalar};

    fn random_bytes(size: usize) -> Vec<u8> {
        (0..size).map(|_| rand::thread_rng().gen()).collect()
    }

    #[test]
    fn add() {
        // Not a multiple of 32 or 8, so every tail path runs
        for size in [1, 7, 8, 41, 64, 100] {
            let mut data1 = random_bytes(size);
            let data2 = random_bytes(size);
            let expected: Vec<u8> = data1.iter().zip(&data2).map(|(a, b)| a ^ b).collect();
            add_assign(&mut data1, &data2);
            assert_eq!(expected, data1);
        }
    }

    #[test]
    fn mul_assign() {
        for size in [5, 41, 77] {
            let scalar = Octet::new(rand::thread_rng().gen_range(2, 255));
            let mut data1 = random_bytes(size);
            let expected: Vec<u8> = data1
                .iter()
                .map(|x| (Octet::new(*x) * scalar).byte())
                .collect();

            mulassign_scalar(&mut data1, &scalar);

            assert_eq!(expected, data1);
        }
    }

    #[test]
    fn mul_assign_by_zero_clears() {
        let mut data = random_bytes(50);
        mulassign_scalar(&mut data, &Octet::zero());
        assert!(data.iter().all(|x| *x == 0));
    }

    #[test]
    fn fma() {
        for size in [3, 41, 96] {
            let scalar = Octet::new(rand::thread_rng().gen_range(1, 255));
            let mut data1 = random_bytes(size);
            let data2 = random_bytes(size);
            let expected: Vec<u8> = data1
                .iter()
                .zip(&data2)
                .map(|(a, b)| (Octet::new(*a) + Octet::new(*b) * scalar).byte())
                .collect();

            fused_addassign_mul_scalar(&mut data1, &data2, &scalar);

            assert_eq!(expected, data1);
        }
    }
}
