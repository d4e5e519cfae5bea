use image::ImageReader;
use scandoc::scan::scan_page;
use scandoc::FilterKind;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    scandoc::core::init_with_level(log::LevelFilter::Debug)?;

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("Usage: scan_document <image_path>");
        return Ok(());
    };

    let img = ImageReader::open(path)?.decode()?;
    let scanned = scan_page(&img, None, FilterKind::Enhance, &Default::default())?;

    println!(
        "scanned page: {}x{}, corners {:?}",
        scanned.page.width(),
        scanned.page.height(),
        scanned.corners.corners()
    );
    scanned.page.save("scanned.png")?;
    Ok(())
}
