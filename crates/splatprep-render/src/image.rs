use crate::error::ImageError;

/// Image size in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

impl From<splatprep_3d::camera::Resolution> for ImageSize {
    fn from(resolution: splatprep_3d::camera::Resolution) -> Self {
        ImageSize {
            width: resolution.width as usize,
            height: resolution.height as usize,
        }
    }
}

/// An interleaved image stored row-major as `[height, width, CHANNELS]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const CHANNELS: usize> {
    size: ImageSize,
    data: Vec<T>,
}

impl<T, const CHANNELS: usize> Image<T, CHANNELS> {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        // check if the data length matches the image size
        let len = Self::num_elements(size)?;
        if data.len() != len {
            return Err(ImageError::InvalidChannelShape(data.len(), len));
        }
        Ok(Self { size, data })
    }

    /// Create a new image with the given size and every channel set to `val`.
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        let data = vec![val; Self::num_elements(size)?];
        Image::new(size, data)
    }

    fn num_elements(size: ImageSize) -> Result<usize, ImageError> {
        size.width
            .checked_mul(size.height)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or(ImageError::SizeOverflow(size.width, size.height))
    }

    /// The size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The number of columns of the image.
    pub fn cols(&self) -> usize {
        self.size.width
    }

    /// The number of rows of the image.
    pub fn rows(&self) -> usize {
        self.size.height
    }

    /// The number of channels of the image.
    pub fn num_channels(&self) -> usize {
        CHANNELS
    }

    /// The pixel data as a flat slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The pixel data as a mutable flat slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Get the channels of the pixel at column `x` and row `y`.
    pub fn get_pixel(&self, x: usize, y: usize) -> Result<&[T], ImageError> {
        let offset = self.offset(x, y)?;
        Ok(&self.data[offset..offset + CHANNELS])
    }

    /// Set the channels of the pixel at column `x` and row `y`.
    pub fn set_pixel(&mut self, x: usize, y: usize, value: [T; CHANNELS]) -> Result<(), ImageError>
    where
        T: Copy,
    {
        let offset = self.offset(x, y)?;
        self.data[offset..offset + CHANNELS].copy_from_slice(&value);
        Ok(())
    }

    fn offset(&self, x: usize, y: usize) -> Result<usize, ImageError> {
        if x >= self.size.width || y >= self.size.height {
            return Err(ImageError::PixelIndexOutOfBounds(x, y));
        }
        Ok((y * self.size.width + x) * CHANNELS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_size() {
        let image_size = ImageSize {
            width: 10,
            height: 20,
        };
        assert_eq!(image_size.width, 10);
        assert_eq!(image_size.height, 20);
        assert_eq!(image_size.to_string(), "10x20");
    }

    #[test]
    fn image_smoke() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 10,
                height: 20,
            },
            vec![0u8; 10 * 20 * 3],
        )?;
        assert_eq!(image.cols(), 10);
        assert_eq!(image.rows(), 20);
        assert_eq!(image.num_channels(), 3);
        Ok(())
    }

    #[test]
    fn image_invalid_shape() {
        let image = Image::<u8, 3>::new([2, 2].into(), vec![0u8; 5]);
        assert!(matches!(image, Err(ImageError::InvalidChannelShape(5, 12))));
    }

    #[test]
    fn image_size_overflow() {
        let image = Image::<u8, 3>::from_size_val([usize::MAX, 2].into(), 0);
        assert!(matches!(image, Err(ImageError::SizeOverflow(usize::MAX, 2))));
        let image = Image::<u8, 3>::new([usize::MAX / 2, 1].into(), vec![]);
        assert!(matches!(image, Err(ImageError::SizeOverflow(_, 1))));
    }

    #[test]
    fn image_pixels() -> Result<(), ImageError> {
        let mut image = Image::<u8, 3>::from_size_val([4, 3].into(), 7)?;
        image.set_pixel(3, 2, [1, 2, 3])?;
        assert_eq!(image.get_pixel(3, 2)?, &[1, 2, 3]);
        assert_eq!(image.get_pixel(0, 0)?, &[7, 7, 7]);
        assert_eq!(&image.as_slice()[33..36], &[1, 2, 3]);
        assert!(image.get_pixel(4, 0).is_err());
        Ok(())
    }
}
