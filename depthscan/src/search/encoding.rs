//! Text decoding helpers for the content scanner.
//!
//! Files are decoded incrementally with `encoding_rs` and split into lines on
//! `\r\n`, `\r` and `\n`, so a file never has to be valid UTF-8 and never has
//! to use a single newline convention.
use encoding_rs::{CoderResult, Decoder, Encoding, UTF_16BE, UTF_16LE, WINDOWS_1252};
use std::io::{self, Read};

use crate::results::NewlineStyle;

/// Encoding assumed when a file carries no byte-order mark.
pub fn default_encoding() -> &'static Encoding {
    WINDOWS_1252
}

/// How much of a file is sampled to classify its line endings.
pub const NEWLINE_SAMPLE_BYTES: usize = 128 * 1024;

const CHUNK_SIZE: usize = 64 * 1024;

/// Longest byte-order mark we recognise.
const BOM_MAX_LEN: usize = 3;

/// Reads up to [`BOM_MAX_LEN`] bytes, enough to recognise any byte-order mark.
pub fn read_head<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(BOM_MAX_LEN);
    reader.by_ref().take(BOM_MAX_LEN as u64).read_to_end(&mut head)?;
    Ok(head)
}

/// The encoding confirmed by a byte-order mark at the start of `head`, with
/// the mark's length.
pub fn detect_bom(head: &[u8]) -> Option<(&'static Encoding, usize)> {
    Encoding::for_bom(head)
}

/// Classifies the line endings in `sample`, decoding it with `encoding`.
/// A leading byte-order mark is skipped.
pub fn detect_newline(sample: &[u8], encoding: &'static Encoding) -> NewlineStyle {
    let body = match detect_bom(sample) {
        Some((bom_encoding, len)) if bom_encoding == encoding => &sample[len..],
        _ => sample,
    };
    let (text, _) = encoding.decode_without_bom_handling(body);

    let crlf = text.matches("\r\n").count();
    let cr = text.matches('\r').count() - crlf;
    let lf = text.matches('\n').count() - crlf;
    NewlineStyle::classify(crlf, cr, lf)
}

/// Reads about [`NEWLINE_SAMPLE_BYTES`] from `reader` for
/// [`detect_newline`]. When the cut would land between the `\r` and `\n` of
/// a pair, the sample is extended by one code unit to keep the pair whole.
pub fn read_newline_sample<R: Read>(reader: R, encoding: &'static Encoding) -> io::Result<Vec<u8>> {
    let (cr, lf) = newline_units(encoding);
    let unit = cr.len();

    let mut sample = Vec::new();
    reader
        .take((NEWLINE_SAMPLE_BYTES + unit) as u64)
        .read_to_end(&mut sample)?;

    if sample.len() > NEWLINE_SAMPLE_BYTES {
        let split = sample[..NEWLINE_SAMPLE_BYTES].ends_with(cr)
            && sample[NEWLINE_SAMPLE_BYTES..].starts_with(lf);
        if !split {
            sample.truncate(NEWLINE_SAMPLE_BYTES);
        }
    }
    Ok(sample)
}

/// Encoded `\r` and `\n` for `encoding`
fn newline_units(encoding: &'static Encoding) -> (&'static [u8], &'static [u8]) {
    if encoding == UTF_16LE {
        (&b"\r\0"[..], &b"\n\0"[..])
    } else if encoding == UTF_16BE {
        (&b"\0\r"[..], &b"\0\n"[..])
    } else {
        (&b"\r"[..], &b"\n"[..])
    }
}

/// Iterator over the decoded lines of a byte stream, terminators removed.
pub struct DecodedLines<R> {
    reader: R,
    decoder: Decoder,
    chunk: Vec<u8>,
    text: String,
    /// Start of the next line in `text`
    pos: usize,
    /// `text[pos..scanned]` is known to hold no terminator
    scanned: usize,
    eof: bool,
}

impl<R: Read> DecodedLines<R> {
    /// Decodes `reader` as `encoding`. Any byte-order mark must already have
    /// been consumed.
    pub fn new(reader: R, encoding: &'static Encoding) -> Self {
        Self {
            reader,
            decoder: encoding.new_decoder_without_bom_handling(),
            chunk: vec![0; CHUNK_SIZE],
            text: String::new(),
            pos: 0,
            scanned: 0,
            eof: false,
        }
    }

    /// Pulls the next chunk through the decoder into `text`.
    fn fill(&mut self) -> io::Result<()> {
        if self.pos > 0 {
            self.text.replace_range(..self.pos, "");
            self.scanned -= self.pos;
            self.pos = 0;
        }

        let n = loop {
            match self.reader.read(&mut self.chunk) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        let last = n == 0;
        let mut input = &self.chunk[..n];

        loop {
            let needed = self
                .decoder
                .max_utf8_buffer_length(input.len())
                .unwrap_or(input.len() * 3 + 4);
            self.text.reserve(needed);
            let (result, read, _) = self.decoder.decode_to_string(input, &mut self.text, last);
            input = &input[read..];
            if let CoderResult::InputEmpty = result {
                break;
            }
        }

        self.eof = last;
        Ok(())
    }
}

impl<R: Read> Iterator for DecodedLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let from = self.scanned.max(self.pos);
            match self.text[from..].find(['\r', '\n']) {
                Some(offset) => {
                    let at = from + offset;
                    let bytes = self.text.as_bytes();
                    let is_cr = bytes[at] == b'\r';
                    // a trailing \r may still pair with a \n in the next chunk
                    if is_cr && at + 1 == bytes.len() && !self.eof {
                        self.scanned = at;
                    } else {
                        let line = self.text[self.pos..at].to_string();
                        let width = if is_cr && bytes.get(at + 1) == Some(&b'\n') {
                            2
                        } else {
                            1
                        };
                        self.pos = at + width;
                        self.scanned = self.pos;
                        return Some(Ok(line));
                    }
                }
                None => self.scanned = self.text.len(),
            }

            if self.eof {
                if self.pos < self.text.len() {
                    let line = self.text[self.pos..].to_string();
                    self.pos = self.text.len();
                    self.scanned = self.pos;
                    return Some(Ok(line));
                }
                return None;
            }

            if let Err(e) = self.fill() {
                self.eof = true;
                self.text.clear();
                self.pos = 0;
                self.scanned = 0;
                return Some(Err(e));
            }
        }
    }
}
