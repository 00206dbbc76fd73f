//! Hash-chain block compressor, used for levels at or above
//! [`CLEVEL_CHAIN_MIN`](crate::config::CLEVEL_CHAIN_MIN).
//!
//! Every position is linked into a chain of earlier positions sharing the
//! same 4-byte hash. At each position the chain is walked for up to
//! `max_attempts` candidates within [`LZ4_DISTANCE_MAX`] and the longest
//! match wins. Output uses the same sequence writer as the fast matcher, so
//! both produce ordinary LZ4 blocks.

use super::types::{
    count, read32, write_last_literals, write_sequence, LASTLITERALS, LZ4_DISTANCE_MAX,
    LZ4_MIN_LENGTH, MFLIMIT, MINMATCH,
};

/// Log₂ of the chain head table size.
pub const LZ4HC_HASH_LOG: u32 = 15;
const LZ4HC_HASHTABLESIZE: usize = 1 << LZ4HC_HASH_LOG;

/// Chain links are indexed by position modulo 64 KiB.
const LZ4HC_MAXD: usize = 1 << 16;
const LZ4HC_MAXD_MASK: usize = LZ4HC_MAXD - 1;

const NO_POSITION: u32 = u32::MAX;

#[inline(always)]
fn hash_hc(sequence: u32) -> usize {
    (sequence.wrapping_mul(2_654_435_761) >> (32 - LZ4HC_HASH_LOG)) as usize
}

/// Head table plus 16-bit back-links.
pub struct ChainTables {
    head: Vec<u32>,
    chain: Vec<u16>,
    next_to_update: usize,
}

impl Default for ChainTables {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainTables {
    pub fn new() -> Self {
        Self {
            head: vec![NO_POSITION; LZ4HC_HASHTABLESIZE],
            chain: vec![0u16; LZ4HC_MAXD],
            next_to_update: 0,
        }
    }

    /// Forget every linked position.
    pub fn reset(&mut self) {
        self.head.fill(NO_POSITION);
        self.chain.fill(0);
        self.next_to_update = 0;
    }

    /// Shift stored positions down by `shift`, a multiple of 64 KiB, so chain
    /// slots keep their index.
    pub fn rebase(&mut self, shift: usize) {
        debug_assert_eq!(shift & LZ4HC_MAXD_MASK, 0);
        let delta = shift as u32;
        for head in &mut self.head {
            *head = match *head {
                NO_POSITION => NO_POSITION,
                pos if pos < delta => NO_POSITION,
                pos => pos - delta,
            };
        }
        self.next_to_update = self.next_to_update.saturating_sub(shift);
    }

    /// Link every position in `next_to_update..target` into its chain.
    fn insert_until(&mut self, buf: &[u8], target: usize) {
        while self.next_to_update < target {
            let pos = self.next_to_update;
            let h = hash_hc(read32(buf, pos));
            let prev = self.head[h];
            let delta = if prev == NO_POSITION {
                0
            } else {
                pos - prev as usize
            };
            self.chain[pos & LZ4HC_MAXD_MASK] = if delta > LZ4_DISTANCE_MAX {
                0
            } else {
                delta as u16
            };
            self.head[h] = pos as u32;
            self.next_to_update += 1;
        }
    }

    /// Longest match for `ip` as `(candidate, length)`; length 0 when none.
    fn find_longest_match(
        &self,
        buf: &[u8],
        ip: usize,
        matchlimit: usize,
        max_attempts: u32,
    ) -> (usize, usize) {
        let mut best = (0usize, 0usize);
        let mut candidate = self.head[hash_hc(read32(buf, ip))];
        let mut attempts = max_attempts;

        while candidate != NO_POSITION && attempts > 0 {
            let cand = candidate as usize;
            if cand >= ip || ip - cand > LZ4_DISTANCE_MAX {
                break;
            }
            attempts -= 1;

            let best_len = best.1;
            if buf[cand + best_len] == buf[ip + best_len] && read32(buf, cand) == read32(buf, ip)
            {
                let len = MINMATCH + count(buf, ip + MINMATCH, cand + MINMATCH, matchlimit);
                if len > best_len {
                    best = (cand, len);
                    if ip + len >= matchlimit {
                        break;
                    }
                }
            }

            // A link may point below a rebased buffer's front.
            let delta = self.chain[cand & LZ4HC_MAXD_MASK] as usize;
            if delta == 0 || delta > cand {
                break;
            }
            candidate = (cand - delta) as u32;
        }
        best
    }

    /// Compress `buf[start..]` with `buf[..start]` as history.
    ///
    /// Positions already linked must describe `buf`: keep the tables across
    /// calls only while `buf` grows at the back (or after [`rebase`](Self::rebase)),
    /// otherwise [`reset`](Self::reset) first.
    pub fn compress(&mut self, buf: &[u8], start: usize, max_attempts: u32, dst: &mut Vec<u8>) {
        let end = buf.len();
        let mut anchor = start;

        if end - start < LZ4_MIN_LENGTH {
            write_last_literals(dst, &buf[anchor..]);
            return;
        }

        let mflimit = end - MFLIMIT;
        let matchlimit = end - LASTLITERALS;
        let mut ip = start;

        while ip <= mflimit {
            self.insert_until(buf, ip);
            let (mut candidate, mut len) = self.find_longest_match(buf, ip, matchlimit, max_attempts);
            if len < MINMATCH {
                ip += 1;
                continue;
            }

            let mut pos = ip;
            while pos > anchor && candidate > 0 && buf[pos - 1] == buf[candidate - 1] {
                pos -= 1;
                candidate -= 1;
                len += 1;
            }

            write_sequence(dst, &buf[anchor..pos], pos - candidate, len);
            ip = pos + len;
            anchor = ip;
        }

        write_last_literals(dst, &buf[anchor..]);
    }
}
