//! Integration tests for the URL harvester and its producer seams.

use media_harvester::harvest::DomSnapshot;
use media_harvester::{MediaKind, ReplaySource, harvest, harvest_page};

const PAGE: &str = "https://shop.example.com/products/lamp";

#[test]
fn test_dom_snapshot_from_inspection_script_flows_into_harvest() {
    let raw = r#"{
        "sources": ["/media/lamp.JPG", "https://cdn.example.com/v/demo.mp4#t=3", "data:image/gif;base64,R0lGODlhAQABAAAAACw="],
        "srcsets": ["/media/lamp-480.webp 480w, /media/lamp-960.webp 960w"],
        "backgrounds": ["url(\"/media/texture.avif\"), linear-gradient(#fff, #000)"]
    }"#;
    let snapshot: DomSnapshot = serde_json::from_str(raw).expect("snapshot JSON parses");
    let dom = snapshot.into_references();

    let found = harvest(&[] as &[&str], &dom, PAGE);

    let images: Vec<&str> = found.images.iter().map(|r| r.identity()).collect();
    assert_eq!(
        images,
        vec![
            "https://shop.example.com/media/lamp.JPG",
            "data:image/gif;base64,R0lGODlhAQABAAAAACw=",
            "https://shop.example.com/media/lamp-480.webp",
            "https://shop.example.com/media/lamp-960.webp",
            "https://shop.example.com/media/texture.avif",
        ]
    );
    assert_eq!(found.videos.len(), 1);
    assert_eq!(found.videos[0].kind(), MediaKind::Video);
}

#[test]
fn test_network_and_dom_channels_deduplicate() {
    let network = [
        "https://shop.example.com/media/lamp.jpg",
        "https://shop.example.com/media/lamp.jpg",
        "https://shop.example.com/api/cart",
    ];
    let dom = ["/media/lamp.jpg", "../media/lamp.jpg"];

    let found = harvest(&network, &dom, PAGE);

    assert_eq!(found.images.len(), 1);
    assert_eq!(found.discarded, 1);
}

#[test]
fn test_classification_edge_cases() {
    let network = [
        "https://a.example.com/img.png?x=1",
        "https://a.example.com/IMG.JPG",
        "https://a.example.com/movie.MoV?download=true",
        "https://a.example.com/archive.zip",
        "https://a.example.com/noext",
    ];
    let dom = [
        "data:image/png;base64,iVBORw0KGgo=",
        "data:application/octet-stream;base64,AAAA",
        "data:;base64,AAAA",
    ];

    let found = harvest(&network, &dom, PAGE);

    assert_eq!(found.images.len(), 3);
    assert_eq!(found.videos.len(), 1);
    assert_eq!(found.discarded, 4);
    assert!(matches!(found.images[2].kind(), MediaKind::InlineData(_)));
}

#[test]
fn test_two_identical_inline_payloads_share_identity() {
    let payload = "data:image/png;base64,iVBORw0KGgo=";
    let found = harvest(&[payload], &[payload], PAGE);
    assert_eq!(found.images.len(), 1);
}

#[tokio::test]
async fn test_replay_source_drives_harvest_page() {
    let mut source = ReplaySource::new(
        ["https://shop.example.com/media/hero.webm"],
        ["/media/hero.webm", "thumb.gif"],
    );
    source.push_network("https://tracker.example.net/pixel");

    let found = harvest_page(&mut source, PAGE)
        .await
        .expect("replay never fails");

    assert_eq!(found.videos.len(), 1);
    assert_eq!(
        found.images[0].identity(),
        "https://shop.example.com/products/thumb.gif"
    );
    assert_eq!(found.discarded, 1);

    // Network events were consumed by the first harvest.
    let again = harvest_page(&mut source, PAGE).await.expect("replay never fails");
    assert!(again.videos.len() == 1 && again.discarded == 0);
}
