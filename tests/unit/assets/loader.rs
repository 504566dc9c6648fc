use super::*;

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

struct MapFetcher {
    slow_ms: u64,
}

impl AssetFetcher for MapFetcher {
    fn fetch(&self, reference: &str) -> BoothResult<Vec<u8>> {
        match reference {
            "ok.png" => Ok(png_bytes(4, 3)),
            "slow.png" => {
                std::thread::sleep(Duration::from_millis(self.slow_ms));
                Ok(png_bytes(1, 1))
            }
            "garbage.png" => Ok(b"nope".to_vec()),
            other => Err(BoothError::frame_load(format!("404: {other}"))),
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn load_all_settles_each_slot_independently() {
    let sources = vec![
        Some(ImageSource::Asset("ok.png".to_owned())),
        None,
        Some(ImageSource::Asset("missing.png".to_owned())),
        Some(ImageSource::Asset("garbage.png".to_owned())),
        Some(ImageSource::encoded(png_bytes(2, 2))),
    ];
    let fetcher: Arc<dyn AssetFetcher> = Arc::new(MapFetcher { slow_ms: 0 });
    let loads = load_all(&sources, fetcher, DEFAULT_LOAD_TIMEOUT).await;

    assert_eq!(loads.len(), 5);
    assert_eq!(loads[0].image().map(|i| (i.width, i.height)), Some((4, 3)));
    assert!(matches!(loads[1], SlotLoad::Empty));
    assert!(loads[2].is_failed());
    assert!(loads[3].is_failed());
    assert_eq!(loads[4].image().map(|i| i.width), Some(2));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_loads_time_out_without_blocking_others() {
    let sources = vec![
        Some(ImageSource::Asset("slow.png".to_owned())),
        Some(ImageSource::Asset("ok.png".to_owned())),
    ];
    let fetcher: Arc<dyn AssetFetcher> = Arc::new(MapFetcher { slow_ms: 500 });
    let loads = load_all(&sources, fetcher, Duration::from_millis(50)).await;

    match &loads[0] {
        SlotLoad::Failed(msg) => assert!(msg.contains("timed out"), "{msg}"),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(loads[1].image().is_some());
}

#[tokio::test]
async fn load_one_rasterizes_svg_at_requested_size() {
    let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="5" height="5"><rect width="5" height="5"/></svg>"#;
    let fetcher: Arc<dyn AssetFetcher> = Arc::new(MapFetcher { slow_ms: 0 });
    let load = load_one(
        &ImageSource::encoded(svg.to_vec()),
        fetcher,
        Some(PixelSize::new(30, 60).unwrap()),
        DEFAULT_LOAD_TIMEOUT,
    )
    .await;
    assert_eq!(load.image().map(|i| (i.width, i.height)), Some((30, 60)));
}
