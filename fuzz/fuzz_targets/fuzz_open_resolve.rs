#![no_main]

use fsview::{FilesystemView, Format, Image};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for format in [Format::Ext2, Format::Minix] {
        let Ok(view) = FilesystemView::open(Image::new(data), format) else {
            continue;
        };
        let root = view.root_inode();
        let _ = view.list_directory(root);
        if let Ok(ino) = view.resolve_path("/dir_a/dir_b/foobar.txt") {
            let _ = view.read_file_data(ino);
        }
        let _ = view.walk(root);
    }
});
