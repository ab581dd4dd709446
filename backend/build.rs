use std::fs;
use std::path::Path;

fn main() {
    let out_dir = Path::new("static");
    let dist_dir = Path::new("../frontend/dist");

    // The embedded bundle directory has to exist even before the frontend
    // has been built once.
    fs::create_dir_all(out_dir.join("dist")).expect("create static/dist");

    if dist_dir.exists() {
        let _ = fs::remove_dir_all(out_dir.join("dist"));
        fs_extra::dir::copy(
            dist_dir,
            out_dir,
            &fs_extra::dir::CopyOptions::new().overwrite(true),
        )
        .expect("copy frontend bundle");
    }
    println!("cargo:rerun-if-changed=../frontend/dist");
}
