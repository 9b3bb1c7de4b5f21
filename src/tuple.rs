use crate::rng::rand;
use crate::systematic_constants::Parameters;
#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};
use std::cmp::min;

// Deg[v] as defined in section 5.3.5.2
const DEGREE_DISTRIBUTION: [u32; 31] = [
    0, 5243, 529531, 704294, 791675, 844104, 879057, 904023, 922747, 937311, 948962, 958494,
    966438, 973160, 978921, 983914, 988283, 992138, 995565, 998631, 1001391, 1003887, 1006157,
    1008229, 1010129, 1011876, 1013490, 1014983, 1016370, 1017662, 1048576,
];

pub fn deg(v: u32, lt_symbols: u32) -> u32 {
    assert!(v < 1048576);
    let d = DEGREE_DISTRIBUTION.partition_point(|f| *f <= v) as u32;
    min(d, lt_symbols - 2)
}

/// Tuple[K', X] of section 5.3.5.4. It is the whole description of which intermediate symbols an
/// encoding symbol sums.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct EncodingTuple {
    pub d: u32,
    pub a: u32,
    pub b: u32,
    pub d1: u32,
    pub a1: u32,
    pub b1: u32,
}

impl EncodingTuple {
    #[allow(non_snake_case)]
    pub fn new(params: &Parameters, internal_symbol_id: u32) -> EncodingTuple {
        let J = params.systematic_index();
        let W = params.lt_symbols();
        let P1 = params.p1();

        let mut A = 53591u32.wrapping_add(J.wrapping_mul(997));
        if A % 2 == 0 {
            A = A.wrapping_add(1);
        }
        let B = 10267u32.wrapping_mul(J + 1);
        let y = B.wrapping_add(internal_symbol_id.wrapping_mul(A));

        let v = rand(y, 0, 1048576);
        let d = deg(v, W);
        let a = 1 + rand(y, 1, W - 1);
        let b = rand(y, 2, W);
        let d1 = if d < 4 {
            2 + rand(internal_symbol_id, 3, 2)
        } else {
            2
        };
        let a1 = 1 + rand(internal_symbol_id, 4, P1 - 1);
        let b1 = rand(internal_symbol_id, 5, P1);

        EncodingTuple {
            d,
            a,
            b,
            d1,
            a1,
            b1,
        }
    }

    /// Number of intermediate symbols the tuple touches.
    pub fn len(&self) -> usize {
        (self.d + self.d1) as usize
    }

    /// Visits the intermediate symbol indices of Enc[] (section 5.3.5.3): d LT indices, then d1
    /// PI indices offset by W.
    pub fn for_each_index<F: FnMut(usize)>(&self, params: &Parameters, mut visit: F) {
        let w = params.lt_symbols();
        let p = params.pi_symbols();
        let p1 = params.p1();
        debug_assert!(self.d > 0);
        debug_assert!(1 <= self.a && self.a < w);
        debug_assert!(self.b < w);
        debug_assert!(self.d1 == 2 || self.d1 == 3);
        debug_assert!(1 <= self.a1 && self.a1 < p1);
        debug_assert!(self.b1 < p1);

        let mut b = self.b;
        visit(b as usize);
        for _ in 1..self.d {
            b = (b + self.a) % w;
            visit(b as usize);
        }

        let mut b1 = self.b1;
        while b1 >= p {
            b1 = (b1 + self.a1) % p1;
        }
        visit((w + b1) as usize);
        for _ in 1..self.d1 {
            b1 = (b1 + self.a1) % p1;
            while b1 >= p {
                b1 = (b1 + self.a1) % p1;
            }
            visit((w + b1) as usize);
        }
    }

    pub fn indices(&self, params: &Parameters) -> Vec<usize> {
        let mut indices = Vec::with_capacity(self.len());
        self.for_each_index(params, |index| indices.push(index));
        indices
    }
}
