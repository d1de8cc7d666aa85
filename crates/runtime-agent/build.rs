fn main() {
    if let Err(err) = tonic_build::compile_protos("proto/content.proto") {
        eprintln!("compiling content.proto: {err}");
        std::process::exit(1);
    }
}
