use std::cell::RefCell;
use std::path::Path;

use anyhow::{Result, bail};
use log::debug;
use opencv::core::{KeyPoint, Mat, Ptr, Size, Vector};
use opencv::imgproc::InterpolationFlags;
use opencv::prelude::*;
use opencv::{features2d, imgproc, videoio};

use crate::config::FeatureOptions;
use crate::extract::sample_frame_indices;
use crate::signature::TEXTURE_DIM;

thread_local! {
    // 按 nfeatures 缓存的 ORB 检测器，每个 rayon 线程各持有一个
    static ORB: RefCell<Option<(u32, Ptr<features2d::ORB>)>> = const { RefCell::new(None) };
}

/// 一个视频所有采样帧的汇总
#[derive(Debug, Clone)]
pub struct VisualSummary {
    /// 所有帧 HSV 直方图之和
    pub histogram: Vec<f32>,
    /// ORB 描述符均值的均值，没有特征点时为 0
    pub texture: Vec<f32>,
}

/// 解码视频的采样帧并汇总视觉特征
///
/// 无法打开或帧数不大于 0 时返回错误；单帧的失败会被跳过；
/// 如果没有任何一帧得到直方图则返回 `Ok(None)`。
pub fn analyze(path: &Path, opts: &FeatureOptions) -> Result<Option<VisualSummary>> {
    let filename = path.to_string_lossy();
    let mut cap = videoio::VideoCapture::from_file(&*filename, videoio::CAP_ANY)?;
    if !cap.is_opened()? {
        bail!("无法打开视频: {}", filename);
    }

    let total = cap.get(videoio::CAP_PROP_FRAME_COUNT)? as i64;
    if total <= 0 {
        bail!("视频帧数为 {}: {}", total, filename);
    }

    let size = opts.analysis_size as i32;
    let mut histogram: Option<Vec<f32>> = None;
    let mut descriptors = vec![];

    for idx in sample_frame_indices(total, opts.frames as usize) {
        let frame = match read_frame(&mut cap, idx, size) {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                debug!("读取第 {} 帧失败: {}", idx, filename);
                continue;
            }
            Err(e) => {
                debug!("读取第 {} 帧失败: {}: {}", idx, filename, e);
                continue;
            }
        };

        match hsv_histogram(&frame) {
            Ok(h) => match &mut histogram {
                Some(acc) => acc.iter_mut().zip(h).for_each(|(a, b)| *a += b),
                None => histogram = Some(h),
            },
            Err(e) => debug!("计算第 {} 帧直方图失败: {}", idx, e),
        }

        match mean_descriptor(&frame, opts.orb_nfeatures) {
            Ok(Some(d)) => descriptors.push(d),
            Ok(None) => {}
            Err(e) => debug!("计算第 {} 帧特征点失败: {}", idx, e),
        }
    }
    cap.release()?;

    let Some(histogram) = histogram else {
        return Ok(None);
    };

    let mut texture = vec![0.0; TEXTURE_DIM];
    if !descriptors.is_empty() {
        for d in &descriptors {
            texture.iter_mut().zip(d).for_each(|(t, x)| *t += x);
        }
        let n = descriptors.len() as f32;
        texture.iter_mut().for_each(|t| *t /= n);
    }

    Ok(Some(VisualSummary { histogram, texture }))
}

fn read_frame(cap: &mut videoio::VideoCapture, idx: i64, size: i32) -> opencv::Result<Option<Mat>> {
    cap.set(videoio::CAP_PROP_POS_FRAMES, idx as f64)?;
    let mut frame = Mat::default();
    if !cap.read(&mut frame)? || frame.empty() {
        return Ok(None);
    }
    let mut output = Mat::default();
    imgproc::resize(
        &frame,
        &mut output,
        Size::new(size, size),
        0.,
        0.,
        InterpolationFlags::INTER_LINEAR as i32,
    )?;
    Ok(Some(output))
}

/// 8 x 8 x 4 的 HSV 联合直方图，按行优先展平
fn hsv_histogram(frame: &Mat) -> opencv::Result<Vec<f32>> {
    let mut hsv = Mat::default();
    imgproc::cvt_color_def(frame, &mut hsv, imgproc::COLOR_BGR2HSV)?;

    let images = Vector::<Mat>::from_iter([hsv]);
    let channels = Vector::<i32>::from(vec![0, 1, 2]);
    let hist_size = Vector::<i32>::from(vec![8, 8, 4]);
    let ranges = Vector::<f32>::from(vec![0., 180., 0., 256., 0., 256.]);
    let mask = Mat::default();
    let mut hist = Mat::default();
    imgproc::calc_hist(&images, &channels, &mask, &mut hist, &hist_size, &ranges, false)?;

    Ok(hist.data_typed::<f32>()?.to_vec())
}

fn create_orb(nfeatures: u32) -> opencv::Result<Ptr<features2d::ORB>> {
    features2d::ORB::create(
        nfeatures as i32,
        1.2,
        8,
        31,
        0,
        2,
        features2d::ORB_ScoreType::HARRIS_SCORE,
        31,
        20,
    )
}

/// 单帧 ORB 描述符的均值，没有特征点时返回 `None`
fn mean_descriptor(frame: &Mat, nfeatures: u32) -> opencv::Result<Option<[f32; TEXTURE_DIM]>> {
    let mut gray = Mat::default();
    imgproc::cvt_color_def(frame, &mut gray, imgproc::COLOR_BGR2GRAY)?;

    let mask = Mat::default();
    let mut kps = Vector::<KeyPoint>::new();
    let mut des = Mat::default();
    ORB.with(|cell| -> opencv::Result<()> {
        let mut cell = cell.borrow_mut();
        if !matches!(&*cell, Some((n, _)) if *n == nfeatures) {
            *cell = Some((nfeatures, create_orb(nfeatures)?));
        }
        if let Some((_, orb)) = cell.as_mut() {
            orb.detect_and_compute(&gray, &mask, &mut kps, &mut des, false)?;
        }
        Ok(())
    })?;

    if des.rows() == 0 {
        return Ok(None);
    }

    let mut mean = [0f32; TEXTURE_DIM];
    for row in des.data_typed::<u8>()?.chunks_exact(TEXTURE_DIM) {
        mean.iter_mut().zip(row).for_each(|(m, b)| *m += *b as f32);
    }
    let n = des.rows() as f32;
    mean.iter_mut().for_each(|m| *m /= n);
    Ok(Some(mean))
}

#[cfg(test)]
mod tests {
    use opencv::core::{CV_8UC3, Scalar};

    use super::*;
    use crate::signature::HIST_DIM;

    fn solid_frame(b: f64, g: f64, r: f64) -> Mat {
        Mat::new_rows_cols_with_default(64, 64, CV_8UC3, Scalar::new(b, g, r, 0.)).unwrap()
    }

    #[test]
    fn test_histogram_layout() {
        // 纯红色：H = 0, S = 255, V = 255，对应 (0, 7, 3) 号桶
        let hist = hsv_histogram(&solid_frame(0., 0., 255.)).unwrap();
        assert_eq!(hist.len(), HIST_DIM);
        assert_eq!(hist.iter().sum::<f32>(), 64. * 64.);
        assert_eq!(hist[7 * 4 + 3], 64. * 64.);
    }

    #[test]
    fn test_flat_frame_has_no_descriptor() {
        let frame = solid_frame(128., 128., 128.);
        assert!(mean_descriptor(&frame, 500).unwrap().is_none());
    }
}
