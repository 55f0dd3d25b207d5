use ndarray::{Array3, Array4};
use ort::{inputs, session::Session, value::Tensor};

use crate::error::DetectionError;

fn backend(err: impl std::fmt::Display) -> DetectionError {
    DetectionError::Backend(err.to_string())
}

/// 运行模型推理
///
/// # 参数
/// * `model` - ONNX模型Session
/// * `input` - 输入张量，形状应为(1, 3, height, width)
///
/// # 返回值
/// 模型的第一个输出，形状为 `[1, a, b]`
pub fn run_inference(model: &mut Session, input: &Array4<f32>) -> Result<Array3<f32>, DetectionError> {
    let shape: Vec<usize> = input.shape().to_vec();
    let (data, _offset) = input.clone().into_raw_vec_and_offset();
    let input_tensor = Tensor::from_array(([shape[0], shape[1], shape[2], shape[3]], data)).map_err(backend)?;

    let input_name = model
        .inputs
        .first()
        .map(|i| i.name.clone())
        .unwrap_or_else(|| "images".to_string());
    let outputs = model
        .run(inputs![input_name.as_str() => input_tensor])
        .map_err(backend)?;

    let (out_shape, data) = outputs[0].try_extract_tensor::<f32>().map_err(backend)?;
    let dims: Vec<usize> = out_shape.iter().map(|&d| d.max(0) as usize).collect();
    if dims.len() != 3 {
        return Err(DetectionError::Input(format!("模型输出形状不符合预期: {dims:?}")));
    }

    Array3::from_shape_vec((dims[0], dims[1], dims[2]), data.to_vec())
        .map_err(|e| DetectionError::Input(e.to_string()))
}
