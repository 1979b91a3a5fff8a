//! ファイルI/Oユーティリティ（gzip対応）
//!
//! パス `-` は標準入出力を表す。拡張子 `.gz` のパスは透過的に圧縮・展開する。

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const READER_BUF_CAP: usize = 128 * 1024; // 128 KiB
const WRITER_BUF_CAP: usize = 64 * 1024;

/// 標準入出力を表すパスか
pub fn is_stdio<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().as_os_str() == "-"
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

pub fn open_reader<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead + Send>> {
    let p = path.as_ref();
    if is_stdio(p) {
        return Ok(Box::new(BufReader::with_capacity(READER_BUF_CAP, io::stdin())));
    }
    let f = File::open(p)?;
    if is_gzip(p) {
        // 複数メンバーを連結した .gz も読めるように MultiGzDecoder を使う
        let dec = flate2::read::MultiGzDecoder::new(f);
        return Ok(Box::new(BufReader::with_capacity(READER_BUF_CAP, dec)));
    }
    Ok(Box::new(BufReader::with_capacity(READER_BUF_CAP, f)))
}

/// 出力先ライター
///
/// 圧縮ストリームの終端処理エラーを取りこぼさないよう、最後に [`Writer::close`] を呼ぶ。
#[must_use = "call .close() to propagate compression/IO errors"]
pub enum Writer {
    Plain(BufWriter<File>),
    Stdout(BufWriter<io::Stdout>),
    Gz(flate2::write::GzEncoder<BufWriter<File>>),
}

impl Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Writer::Plain(f) => f.write(buf),
            Writer::Stdout(s) => s.write(buf),
            Writer::Gz(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Writer::Plain(f) => f.flush(),
            Writer::Stdout(s) => s.flush(),
            Writer::Gz(e) => e.flush(),
        }
    }
}

impl Writer {
    /// ストリームを確定させ、下位のファイル/標準出力までフラッシュする
    pub fn close(self) -> io::Result<()> {
        match self {
            Writer::Plain(f) => {
                let mut file = f.into_inner().map_err(|e| e.into_error())?;
                file.flush()
            }
            Writer::Stdout(mut s) => s.flush(),
            Writer::Gz(e) => {
                let mut inner = e.finish()?;
                inner.flush()
            }
        }
    }
}

pub fn open_writer<P: AsRef<Path>>(path: P) -> io::Result<Writer> {
    let p = path.as_ref();
    if is_stdio(p) {
        return Ok(Writer::Stdout(BufWriter::with_capacity(WRITER_BUF_CAP, io::stdout())));
    }
    let f = BufWriter::with_capacity(WRITER_BUF_CAP, File::create(p)?);
    if is_gzip(p) {
        let enc = flate2::write::GzEncoder::new(f, flate2::Compression::default());
        return Ok(Writer::Gz(enc));
    }
    Ok(Writer::Plain(f))
}

/// レーン番号（0始まり）に対応する出力ファイルパス
///
/// ファイル名は 1 始まりで `part-<n>.epd`（gzip 時は `part-<n>.epd.gz`）。
pub fn lane_output_path(dir: &Path, lane: usize, gzip: bool) -> PathBuf {
    let ext = if gzip { "epd.gz" } else { "epd" };
    dir.join(format!("part-{}.{ext}", lane + 1))
}
