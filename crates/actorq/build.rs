fn main() {
    println!("cargo:rerun-if-changed=proto/actorq.proto");
    prost_build::compile_protos(&["proto/actorq.proto"], &["proto/"])
        .expect("failed to compile actorq.proto");
}
