fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=../inventory-service/proto/inventory.proto");
    println!("cargo:rerun-if-changed=../payment-service/proto/payment.proto");

    // order-service only calls these two RPC surfaces; it never serves one,
    // so only client stubs are generated (spec.md §4.6).
    tonic_build::configure()
        .build_server(false)
        .build_client(true)
        .compile(
            &[
                "../inventory-service/proto/inventory.proto",
                "../payment-service/proto/payment.proto",
            ],
            &["../inventory-service/proto", "../payment-service/proto"],
        )?;
    Ok(())
}
