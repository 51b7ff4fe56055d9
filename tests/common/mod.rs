//! Common test utilities
//!
//! This module is shared across all integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use teloxide::types::ChatId;

use tubedrop::core::config::UploadSettings;
use tubedrop::telegram::HandlerSettings;

pub fn create_test_chat_id() -> ChatId {
    ChatId(123_456_789)
}

/// Deterministic non-repeating-ish content so misplaced bytes show up
pub fn patterned_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Small limits so split uploads can be tested with kilobyte files
pub fn small_upload_settings() -> UploadSettings {
    UploadSettings::new(50 * 1024, 48 * 1024).unwrap()
}

pub fn test_settings(temp_dir: &Path, cookies_file: Option<PathBuf>) -> HandlerSettings {
    HandlerSettings {
        temp_dir: temp_dir.to_path_buf(),
        cookies_file,
        upload: small_upload_settings(),
        max_height: 360,
    }
}

/// Writes an executable shell script standing in for yt-dlp.
#[cfg(unix)]
pub fn write_fake_ytdlp(dir: &Path, body: &str) -> PathBuf {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-yt-dlp");
    {
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "#!/bin/sh").unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file.sync_all().unwrap();
    }
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Script body that records its arguments, then writes `size` bytes to the
/// `-o` template (with `%(id)s.%(ext)s` filled in) and prints the path.
pub fn successful_ytdlp_body(args_log: &Path, size: usize) -> String {
    format!(
        r#"
printf '%s\n' "$@" > '{log}'
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; shift; fi
  shift
done
file=$(printf '%s' "$out" | sed -e 's/%(id)s/testid/' -e 's/%(ext)s/mp4/')
head -c {size} /dev/zero > "$file"
echo "$file"
exit 0
"#,
        log = args_log.display(),
        size = size
    )
}
