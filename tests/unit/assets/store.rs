use super::*;
use crate::assets::source::encode_data_uri;

#[test]
fn normalize_rel_path_accepts_web_rooted_and_rejects_traversal() {
    assert_eq!(normalize_rel_path("/frames/a.png").unwrap(), "frames/a.png");
    assert_eq!(normalize_rel_path("frames//./b.png").unwrap(), "frames/b.png");
    assert_eq!(normalize_rel_path("frames\\c.png").unwrap(), "frames/c.png");
    assert!(normalize_rel_path("../secret").is_err());
    assert!(normalize_rel_path("frames/../../x").is_err());
    assert!(normalize_rel_path("/").is_err());
    assert!(normalize_rel_path("https://example.com/a.png").is_err());
}

#[test]
fn fs_fetcher_reads_under_root() {
    let dir = std::env::temp_dir().join(format!("blubooth-fetch-{}", std::process::id()));
    std::fs::create_dir_all(dir.join("frames")).unwrap();
    std::fs::write(dir.join("frames/a.bin"), [7u8, 8, 9]).unwrap();

    let fetcher = FsFetcher::new(&dir);
    assert_eq!(fetcher.fetch("/frames/a.bin").unwrap(), vec![7, 8, 9]);
    let err = fetcher.fetch("frames/missing.bin").unwrap_err();
    assert!(err.to_string().contains("read asset"));

    std::fs::remove_dir_all(&dir).unwrap();
}

struct NoFetch;

impl AssetFetcher for NoFetch {
    fn fetch(&self, reference: &str) -> BoothResult<Vec<u8>> {
        Err(BoothError::frame_load(format!("unreachable: {reference}")))
    }
}

#[test]
fn source_bytes_covers_every_source_kind() {
    let bytes = source_bytes(&ImageSource::encoded(vec![1, 2]), &NoFetch).unwrap();
    assert_eq!(*bytes, vec![1, 2]);

    let uri = ImageSource::DataUri(encode_data_uri("image/png", &[3, 4]));
    assert_eq!(*source_bytes(&uri, &NoFetch).unwrap(), vec![3, 4]);

    let err = source_bytes(&ImageSource::Asset("x.png".to_owned()), &NoFetch).unwrap_err();
    assert!(matches!(err, BoothError::FrameLoad(_)));
}
