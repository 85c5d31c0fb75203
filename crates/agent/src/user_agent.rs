use rand::seq::SliceRandom;
use rand::Rng;

const ANDROID_VERSIONS: [&str; 4] = ["10.0", "11.0", "12.0", "13.0"];

const ANDROID_DEVICES: [&str; 24] = [
    "SM-G960F",
    "SM-A505F",
    "SM-N975F",
    "SM-G973F",
    "SM-G980F",
    "SM-G998B",
    "SM-G991B",
    "SM-F711B",
    "Pixel 3",
    "Pixel 4a",
    "Pixel 5",
    "Pixel 6",
    "Pixel 6 Pro",
    "Pixel 7",
    "Pixel 7 Pro",
    "OnePlus 9",
    "OnePlus 10 Pro",
    "OnePlus Nord 2",
    "Xiaomi Mi 11",
    "Xiaomi Redmi Note 9",
    "Huawei P40",
    "Sony Xperia 5",
    "LG V60",
    "Nokia 8.3",
];

/// A plausible Android Chrome user agent, different on every call.
pub fn random_android_chrome() -> String {
    let mut rng = rand::thread_rng();
    let chrome = format!(
        "{}.{}.{}.{}",
        rng.gen_range(110..127),
        rng.gen_range(0..10),
        rng.gen_range(1000..10000),
        rng.gen_range(0..100)
    );
    let android = ANDROID_VERSIONS.choose(&mut rng).copied().unwrap_or("13.0");
    let device = ANDROID_DEVICES.choose(&mut rng).copied().unwrap_or("Pixel 7");
    format!(
        "Mozilla/5.0 (Linux; Android {android}; {device}) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/{chrome} Mobile Safari/537.36"
    )
}
