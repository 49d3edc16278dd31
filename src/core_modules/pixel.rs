// THEORY (single-pixel ink classification):
// The `pixel` module answers one question about one pixel: is this marker ink?
// It has no knowledge of neighbours; connectivity and shape belong to the region
// detector. Users circle dates with a red pen, so the classifier works in HSV terms
// rather than raw RGB thresholds: hue picks the color family, while saturation and
// value reject the gray paper, black print and washed-out glare that share a
// "reddish" channel balance in a photograph.
//
// Channel forms:
// - raw (0..255): the bytes as read from the buffer
// - normalized (0..1 sRGB): divided by 255.0, still gamma-encoded
//
// Heuristics:
// - Hue:        angle on the color wheel in degrees [0, 360)
// - Chroma:     max(R,G,B) - min(R,G,B)
// - Value:      max(R,G,B), HSV brightness
// - Saturation: chroma / value, HSV distance from gray

pub mod pixel {
    use serde::{Deserialize, Serialize};

    pub type Channel = u8;
    pub type NormalizedChannel = f32;
    pub type Hue = f32;
    pub type Chroma = f32;
    pub type ValueHSV = f32;
    pub type SaturationHSV = f32;

    /// A "dumb" data container for the color of a single pixel.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Pixel {
        pub red: Channel,
        pub green: Channel,
        pub blue: Channel,
        pub red_normalized: NormalizedChannel,
        pub green_normalized: NormalizedChannel,
        pub blue_normalized: NormalizedChannel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                red_normalized: red as NormalizedChannel / 255.0,
                green_normalized: green as NormalizedChannel / 255.0,
                blue_normalized: blue as NormalizedChannel / 255.0,
            }
        }

        fn max_channel(&self) -> NormalizedChannel {
            self.red_normalized
                .max(self.green_normalized.max(self.blue_normalized))
        }

        fn min_channel(&self) -> NormalizedChannel {
            self.red_normalized
                .min(self.green_normalized.min(self.blue_normalized))
        }

        /// Hue angle in degrees [0, 360). Gray pixels report 0.
        pub fn hue(&self) -> Hue {
            let maximum_channel = self.max_channel();
            let chroma = maximum_channel - self.min_channel();

            if chroma <= 1e-6 {
                return 0.0;
            }

            let (base_difference, sector_offset) = if maximum_channel == self.red_normalized {
                (self.green_normalized - self.blue_normalized, 0.0)
            } else if maximum_channel == self.green_normalized {
                (self.blue_normalized - self.red_normalized, 2.0)
            } else {
                (self.red_normalized - self.green_normalized, 4.0)
            };

            let mut hue_degrees = (base_difference / chroma + sector_offset) * 60.0;
            if hue_degrees < 0.0 {
                hue_degrees += 360.0;
            }
            hue_degrees
        }

        /// Chroma (C): color purity = max(R,G,B) - min(R,G,B).
        pub fn chroma(&self) -> Chroma {
            self.max_channel() - self.min_channel()
        }

        /// HSV Value (V): brightness defined as max(R, G, B).
        pub fn value_hsv(&self) -> ValueHSV {
            self.max_channel()
        }

        /// HSV Saturation (S): chroma / value, 0.0 for black.
        pub fn saturation_hsv(&self) -> SaturationHSV {
            let maximum_channel = self.max_channel();
            if maximum_channel <= 1e-6 {
                return 0.0;
            }
            self.chroma() / maximum_channel
        }
    }

    impl From<[Channel; 3]> for Pixel {
        fn from(rgb: [Channel; 3]) -> Self {
            Pixel::new(rgb[0], rgb[1], rgb[2])
        }
    }

    /// Thresholds deciding whether a pixel is red marker ink.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct MarkerColor {
        /// Maximum angular distance from pure red (0°/360°), in degrees.
        pub hue_tolerance: Hue,
        /// Minimum HSV saturation; rejects paper and gray print.
        pub min_saturation: SaturationHSV,
        /// Minimum HSV value; rejects shadows and black ink.
        pub min_value: ValueHSV,
    }

    impl Default for MarkerColor {
        fn default() -> Self {
            Self {
                hue_tolerance: 25.0,
                min_saturation: 0.45,
                min_value: 0.35,
            }
        }
    }

    impl MarkerColor {
        pub fn matches(&self, red: Channel, green: Channel, blue: Channel) -> bool {
            let pixel = Pixel::new(red, green, blue);
            if pixel.saturation_hsv() < self.min_saturation || pixel.value_hsv() < self.min_value {
                return false;
            }
            let hue = pixel.hue();
            hue <= self.hue_tolerance || hue >= 360.0 - self.hue_tolerance
        }
    }

    /// The default "red enough" predicate used by the detector.
    pub fn is_red_mark(red: Channel, green: Channel, blue: Channel) -> bool {
        MarkerColor::default().matches(red, green, blue)
    }
}

#[cfg(test)]
mod tests {
    use super::pixel::*;

    #[test]
    fn pure_red_has_zero_hue_and_full_saturation() {
        let red = Pixel::from([255, 0, 0]);
        assert_eq!(red.hue(), 0.0);
        assert_eq!(red.saturation_hsv(), 1.0);
        assert_eq!(red.value_hsv(), 1.0);
    }

    #[test]
    fn gray_has_no_chroma() {
        let gray = Pixel::new(128, 128, 128);
        assert_eq!(gray.chroma(), 0.0);
        assert_eq!(gray.hue(), 0.0);
        assert_eq!(gray.saturation_hsv(), 0.0);
    }

    #[test]
    fn hue_wraps_below_zero() {
        // Blue slightly above green puts the hue just under 360 degrees.
        let crimson = Pixel::new(200, 0, 60);
        let hue = crimson.hue();
        assert!(hue > 340.0 && hue < 345.0, "hue was {hue}");
    }

    #[test]
    fn marker_accepts_red_ink() {
        assert!(is_red_mark(220, 30, 30));
        assert!(is_red_mark(200, 0, 60));
        assert!(is_red_mark(255, 60, 40));
    }

    #[test]
    fn marker_rejects_paper_print_and_other_hues() {
        assert!(!is_red_mark(255, 255, 255));
        assert!(!is_red_mark(0, 0, 0));
        assert!(!is_red_mark(60, 5, 5));
        assert!(!is_red_mark(255, 165, 0));
        assert!(!is_red_mark(30, 30, 220));
        assert!(!is_red_mark(240, 200, 200));
    }

    #[test]
    fn tolerance_is_configurable() {
        let orange_friendly = MarkerColor {
            hue_tolerance: 45.0,
            ..MarkerColor::default()
        };
        assert!(orange_friendly.matches(255, 165, 0));
        assert!(!MarkerColor::default().matches(255, 165, 0));
    }
}
