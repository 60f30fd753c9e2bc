//! 統合テスト共通ヘルパー
//!
//! - ScriptedModel: 応答を順番に返すChatModel
//! - write_rtstruct: 最小構成のRTSTRUCTファイルを生成

#![allow(dead_code)]

use dicom_core::value::DataSetSequence;
use dicom_core::{DataElement, PrimitiveValue, VR};
use dicom_dictionary_std::{tags, uids};
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};
use roi_relabel::error::{Result, RoiRelabelError};
use roi_relabel::llm::ChatModel;
use roi_relabel_common::ChatMessage;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        let model = Self::default();
        for reply in replies {
            model.push_ok(reply);
        }
        model
    }

    pub fn push_ok(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    pub fn push_err(&self, message: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Err(message.into()));
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }

    /// n回目の呼び出しの最後のメッセージ（ユーザー入力）
    pub fn user_message(&self, n: usize) -> String {
        self.calls()[n].last().unwrap().content.clone()
    }
}

impl ChatModel for ScriptedModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(RoiRelabelError::ApiCall(message)),
            None => Err(RoiRelabelError::ApiCall("応答が用意されていません".into())),
        }
    }
}

/// RTSTRUCTファイルを生成
pub fn write_rtstruct(path: &Path, modality: &str, roi_names: &[&str]) {
    let instance_uid = "2.25.302143547716915239466851577203641587451";

    let items: Vec<InMemDicomObject> = roi_names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            InMemDicomObject::from_element_iter([
                DataElement::new(
                    tags::ROI_NUMBER,
                    VR::IS,
                    PrimitiveValue::from((i + 1).to_string()),
                ),
                DataElement::new(tags::ROI_NAME, VR::LO, PrimitiveValue::from(*name)),
            ])
        })
        .collect();

    let mut obj = InMemDicomObject::new_empty();
    obj.put(DataElement::new(
        tags::SOP_CLASS_UID,
        VR::UI,
        PrimitiveValue::from(uids::RT_STRUCTURE_SET_STORAGE),
    ));
    obj.put(DataElement::new(tags::SOP_INSTANCE_UID, VR::UI, PrimitiveValue::from(instance_uid)));
    obj.put(DataElement::new(tags::MODALITY, VR::CS, PrimitiveValue::from(modality)));
    obj.put(DataElement::new(
        tags::STRUCTURE_SET_ROI_SEQUENCE,
        VR::SQ,
        DataSetSequence::from(items),
    ));

    let file_obj = obj
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(uids::RT_STRUCTURE_SET_STORAGE)
                .media_storage_sop_instance_uid(instance_uid),
        )
        .expect("ファイルメタ情報の生成に失敗");

    file_obj.write_to_file(path).expect("DICOM書き込みに失敗");
}

/// 典型的な3段階の応答
pub const SITE_REPLY: &str = "<think>\n\n</think>\nnasopharynx";

pub const CLASSIFICATION_REPLY: &str = r#"<think>PTVを確認</think>
{
    "Target Volume": ["PTV_70"],
    "Organs at Risk": ["Heart"],
    "Plan-Specific Auxiliary Results": [],
    "Dose Calculation-Specific": ["Couch"]
}"#;

pub const RELABEL_REPLY: &str = r#"</think>
```json
{
    "Target Volume": {"Input": ["PTV_70"], "Relabeled": ["PTV_70Gy"]},
    "Organs at Risk": {"Input": ["Heart"], "Relabeled": ["Heart"]}
}
```"#;
