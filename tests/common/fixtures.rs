//! Audio fixtures
//!
//! Synthesizes WAV files carrying a RIFF `INFO` list, so uploads have real
//! tags and a real duration without binary files in the repository.

use super::constants::*;

/// Tags written into the `INFO` list. `None` fields are left out.
#[derive(Debug, Clone, Default)]
pub struct WavTags<'a> {
    pub artist: Option<&'a str>,
    pub album: Option<&'a str>,
    pub genre: Option<&'a str>,
    pub year: Option<&'a str>,
}

/// A silent WAV file of `seconds` length tagged with `artist` only.
#[allow(dead_code)]
pub fn wav_file(seconds: u32, artist: &str) -> Vec<u8> {
    wav_with_tags(
        seconds,
        &WavTags {
            artist: Some(artist),
            ..Default::default()
        },
    )
}

/// A silent WAV file of `seconds` length with the given tags.
pub fn wav_with_tags(seconds: u32, tags: &WavTags) -> Vec<u8> {
    let channels: u16 = 1;
    let bits_per_sample: u16 = 8;
    let block_align = channels * bits_per_sample / 8;
    let byte_rate = FIXTURE_SAMPLE_RATE * block_align as u32;

    let mut fmt = Vec::new();
    fmt.extend_from_slice(&1u16.to_le_bytes()); // PCM
    fmt.extend_from_slice(&channels.to_le_bytes());
    fmt.extend_from_slice(&FIXTURE_SAMPLE_RATE.to_le_bytes());
    fmt.extend_from_slice(&byte_rate.to_le_bytes());
    fmt.extend_from_slice(&block_align.to_le_bytes());
    fmt.extend_from_slice(&bits_per_sample.to_le_bytes());

    // 8-bit PCM silence is the midpoint, not zero
    let samples = vec![0x80u8; (byte_rate * seconds) as usize];

    let mut body = b"WAVE".to_vec();
    push_chunk(&mut body, b"fmt ", &fmt);
    push_chunk(&mut body, b"data", &samples);

    let info = info_list(tags);
    if !info.is_empty() {
        let mut list = b"INFO".to_vec();
        list.extend_from_slice(&info);
        push_chunk(&mut body, b"LIST", &list);
    }

    let mut file = b"RIFF".to_vec();
    file.extend_from_slice(&(body.len() as u32).to_le_bytes());
    file.extend_from_slice(&body);
    file
}

fn info_list(tags: &WavTags) -> Vec<u8> {
    let fields = [
        (b"IART", tags.artist),
        (b"IPRD", tags.album),
        (b"IGNR", tags.genre),
        (b"ICRD", tags.year),
    ];

    let mut info = Vec::new();
    for (id, value) in fields {
        if let Some(value) = value {
            let mut text = value.as_bytes().to_vec();
            text.push(0);
            push_chunk(&mut info, id, &text);
        }
    }
    info
}

/// Appends a RIFF chunk, padded to an even length.
fn push_chunk(out: &mut Vec<u8>, id: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(id);
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    if data.len() % 2 == 1 {
        out.push(0);
    }
}
