use image::ImageReader;
use scandoc::scan::detect_page;
use scandoc::DetectParams;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("Usage: detect_corners <image_path>");
        return Ok(());
    };

    let img = ImageReader::open(path)?.decode()?;
    match detect_page(&img, &DetectParams::default())? {
        Some(quad) => println!("{}", serde_json::to_string_pretty(quad.corners())?),
        None => println!("no document detected"),
    }
    Ok(())
}
