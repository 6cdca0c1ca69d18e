// In: src/testdata.rs

//! Synthesized MP3 streams for tests.
//!
//! A 417-byte MPEG-1 Layer III frame (128 kbps, 44.1 kHz, stereo, no CRC)
//! whose side information is entirely zero is a valid frame decoding to
//! silence: `part2_3_length == 0` means no scalefactors and no Huffman data.
//! Concatenating them yields an arbitrarily long, well-formed CBR stream
//! without shipping a binary fixture.

pub const FRAME_SAMPLES: usize = 1152;
pub const TEST_CHANNELS: usize = 2;
pub const TEST_HZ: u32 = 44100;
pub const TEST_BITRATE_KBPS: u32 = 128;

const FRAME_BYTES: usize = 417; // floor(144 * 128000 / 44100), no padding bit

/// Builds `good_frames` silent frames followed by one frame whose header is
/// valid but whose side information is not: the window-switching flag is set
/// with the forbidden block type 0. The format layer happily yields the
/// packet (the 4-byte header checks out); the decoder then rejects it, which
/// is exactly the mid-stream corruption shape the read path must report.
pub fn corrupt_tail_stream(good_frames: usize) -> Vec<u8> {
    let mut data = silent_stream(good_frames + 1);
    // Side info granule 0 / channel 0: main_data_begin(9) + private(3) +
    // scfsi(8) + part2_3_length(12) + big_values(9) + global_gain(8) +
    // scalefac_compress(4) puts the window-switching flag at side-info bit
    // 53, i.e. bit 2 of side-info byte 6 = frame byte 10. block_type stays 0.
    let tail = data.len() - FRAME_BYTES;
    data[tail + 10] = 0x04;
    data
}

/// Builds a stream of `frames` consecutive silent frames.
pub fn silent_stream(frames: usize) -> Vec<u8> {
    let mut frame = [0u8; FRAME_BYTES];
    frame[0] = 0xFF; // sync
    frame[1] = 0xFB; // MPEG-1, Layer III, no CRC
    frame[2] = 0x90; // 128 kbps, 44.1 kHz, no padding
    frame[3] = 0x00; // stereo

    let mut data = Vec::with_capacity(frames * FRAME_BYTES);
    for _ in 0..frames {
        data.extend_from_slice(&frame);
    }
    data
}
