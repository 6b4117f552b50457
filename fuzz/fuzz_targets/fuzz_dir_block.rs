#![no_main]

use fsview::{DirEntries, DirScheme, Image};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let image = Image::new(data);
    let len = image.len().min(4096) as u32;
    for scheme in [
        DirScheme::SelfDescribing,
        DirScheme::FixedSlot { name_len: 14 },
        DirScheme::FixedSlot { name_len: 30 },
    ] {
        for entry in DirEntries::new(&image, scheme, 0, len, u64::from(len)) {
            if entry.is_err() {
                break;
            }
        }
    }
});
