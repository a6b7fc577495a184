use huffman_text::HuffmanCodec;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sample_text = "Hello, world! This is a sample text for Huffman coding. \
                      The quick brown fox jumps over the lazy dog.\n\
                      Huffman encoding is a greedy algorithm that builds optimal prefix codes.\n";

    std::fs::write("sample.txt", sample_text)?;
    println!("Created sample file: {} bytes", sample_text.len());

    let mut codec = HuffmanCodec::new();
    let encoded = codec.encode_file(Path::new("sample.txt"))?;

    println!("Code table:");
    for (symbol, code) in codec.tree().code_table().iter() {
        println!("  {:?} -> {}", symbol as char, code);
    }
    println!(
        "Encoded to {}: {} bytes",
        encoded.display(),
        std::fs::metadata(&encoded)?.len()
    );

    let decoded = codec.decode_file(&encoded)?;
    let decoded_text = std::fs::read_to_string(&decoded)?;

    if sample_text == decoded_text {
        println!("Decoded text matches the original.");
    } else {
        return Err("decoded text does not match".into());
    }

    std::fs::remove_file("sample.txt")?;
    std::fs::remove_file(&encoded)?;
    std::fs::remove_file(&decoded)?;

    Ok(())
}
