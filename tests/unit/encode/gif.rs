use super::*;
use crate::playback::clock::AnimationClock;
use crate::playback::frames::CapturedFrame;
use crate::render::backend::FrameRGBA;
use image::AnimationDecoder as _;

fn buffer(colors: &[[u8; 4]]) -> FrameBuffer {
    let run = AnimationClock::default().start(0.0).run();
    let mut buf = FrameBuffer::new();
    for (i, px) in colors.iter().enumerate() {
        buf.push(CapturedFrame {
            run,
            elapsed_ms: i as f64 * 20.0,
            image: FrameRGBA {
                width: 4,
                height: 4,
                data: px.repeat(16),
                premultiplied: true,
            },
        });
    }
    buf
}

fn decode(bytes: &[u8]) -> Vec<image::Frame> {
    let dec = image::codecs::gif::GifDecoder::new(std::io::Cursor::new(bytes)).unwrap();
    dec.into_frames().collect_frames().unwrap()
}

#[test]
fn encodes_every_frame_with_the_delay() {
    let buf = buffer(&[[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]]);
    let mut out = Vec::new();
    {
        let mut sink = GifSink::new(&mut out, GifOpts::default()).unwrap();
        export_frames(&buf, &mut sink).unwrap();
        assert_eq!(sink.written(), 3);
    }
    assert_eq!(&out[..6], b"GIF89a");

    let frames = decode(&out);
    assert_eq!(frames.len(), 3);
    for f in &frames {
        assert_eq!(f.buffer().dimensions(), (4, 4));
        assert_eq!(f.delay().numer_denom_ms(), (20, 1));
    }
    let px = frames[0].buffer().get_pixel(1, 1).0;
    assert!(px[0] > 240 && px[1] < 16 && px[2] < 16, "{px:?}");
}

#[test]
fn rejects_out_of_range_speed() {
    let opts = GifOpts {
        speed: 0,
        ..GifOpts::default()
    };
    assert!(GifSink::new(Vec::new(), opts).is_err());
}

#[test]
fn sink_cannot_be_used_after_end() {
    let mut sink = GifSink::new(Vec::new(), GifOpts::default()).unwrap();
    sink.end().unwrap();
    let img = image::RgbaImage::new(1, 1);
    assert!(sink.push_frame(0, &img).is_err());
}

#[test]
fn write_gif_refuses_an_empty_buffer() {
    let path = std::env::temp_dir().join(format!("motiongram-{}-empty.gif", std::process::id()));
    let err = write_gif(&FrameBuffer::new(), &path, GifOpts::default()).unwrap_err();
    assert!(matches!(err, MotiongramError::Export(_)));
    assert!(!path.exists());
}

#[cfg(target_os = "linux")]
#[test]
fn write_gif_reports_a_full_disk() {
    let buf = buffer(&[[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]]);
    let err = write_gif(&buf, Path::new("/dev/full"), GifOpts::default()).unwrap_err();
    assert!(matches!(err, MotiongramError::Export(_)), "{err}");
}

#[test]
fn write_gif_writes_a_complete_file() {
    let path = std::env::temp_dir().join(format!("motiongram-{}-ok.gif", std::process::id()));
    let buf = buffer(&[[255, 0, 0, 255], [0, 0, 255, 255]]);
    write_gif(&buf, &path, GifOpts::default()).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(bytes.last(), Some(&0x3b));
    assert_eq!(decode(&bytes).len(), 2);
}
